//! Three-valued interpretations, their combinators and their enumerators.

mod builder;
pub use builder::InterpretationBuilder;

#[allow(clippy::module_inception)]
mod interpretation;
pub use interpretation::Interpretation;

mod iterators;
pub use iterators::InterpretationIterator;
pub use iterators::PartialInterpretationIterator;
pub use iterators::TwoValuedInterpretationIterator;

mod mapping;
pub use mapping::DefaultPropositionalMapping;
pub use mapping::PropositionalMapping;

mod view;
pub use view::ArgumentsView;
