//! Arguments of abstract dialectical frameworks.

mod arguments;
pub use arguments::Argument;
pub use arguments::ArgumentSet;
