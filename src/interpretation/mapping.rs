use crate::{
    adf::{Argument, ArgumentSet},
    sat::Atom,
};
use std::collections::HashMap;

/// A mapping between arguments and the atoms encoding their values.
///
/// Each argument is associated with an atom which is true iff the argument is satisfied,
/// and an atom which is true iff the argument is unsatisfied.
/// Such mappings are used to turn SAT witnesses into interpretations (see [`Interpretation::from_witness`](super::Interpretation::from_witness)).
pub trait PropositionalMapping {
    /// Returns the arguments handled by this mapping.
    fn arguments(&self) -> Box<dyn Iterator<Item = &Argument> + '_>;

    /// Returns the atom which is true iff the argument is satisfied.
    ///
    /// # Panics
    ///
    /// Implementations may panic if the argument is unknown to the mapping.
    fn true_atom(&self, argument: &Argument) -> &Atom;

    /// Returns the atom which is true iff the argument is unsatisfied.
    ///
    /// # Panics
    ///
    /// Implementations may panic if the argument is unknown to the mapping.
    fn false_atom(&self, argument: &Argument) -> &Atom;
}

/// A mapping that associates two fresh persistent atoms to each argument of a framework.
///
/// The atoms associated with the argument `a` are named `t(a)` and `f(a)`.
pub struct DefaultPropositionalMapping {
    arguments: Vec<Argument>,
    atoms: HashMap<Argument, (Atom, Atom)>,
}

impl DefaultPropositionalMapping {
    /// Builds the mapping for the arguments of the framework.
    pub fn new(framework: &ArgumentSet) -> Self {
        Self {
            arguments: framework.iter().cloned().collect(),
            atoms: framework
                .iter()
                .map(|a| {
                    (
                        a.clone(),
                        (
                            Atom::persistent(&format!("t({})", a)),
                            Atom::persistent(&format!("f({})", a)),
                        ),
                    )
                })
                .collect(),
        }
    }
}

impl PropositionalMapping for DefaultPropositionalMapping {
    fn arguments(&self) -> Box<dyn Iterator<Item = &Argument> + '_> {
        Box::new(self.arguments.iter())
    }

    fn true_atom(&self, argument: &Argument) -> &Atom {
        &self.atoms[argument].0
    }

    fn false_atom(&self, argument: &Argument) -> &Atom {
        &self.atoms[argument].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpretation::Interpretation;
    use std::collections::HashSet;

    #[test]
    fn test_from_witness() {
        let adf = ArgumentSet::new_with_names(&["a", "b", "c"]);
        let mapping = DefaultPropositionalMapping::new(&adf);
        let a = adf.get_argument("a").unwrap();
        let b = adf.get_argument("b").unwrap();
        let c = adf.get_argument("c").unwrap();
        let witness = HashSet::from([
            mapping.true_atom(a).clone(),
            mapping.false_atom(b).clone(),
            Atom::persistent("unrelated"),
        ]);
        let i = Interpretation::from_witness(&witness, &mapping).unwrap();
        assert!(i.is_satisfied(a));
        assert!(i.is_unsatisfied(b));
        assert!(i.is_undecided(c));
        assert_eq!(3, i.size());
    }

    #[test]
    fn test_atom_names() {
        let adf = ArgumentSet::new_with_names(&["a"]);
        let mapping = DefaultPropositionalMapping::new(&adf);
        let a = adf.get_argument("a").unwrap();
        assert_eq!("t(a)", mapping.true_atom(a).name());
        assert_eq!("f(a)", mapping.false_atom(a).name());
        assert!(!mapping.true_atom(a).is_transient());
    }

    #[test]
    #[should_panic]
    fn test_unknown_argument() {
        let adf = ArgumentSet::new_with_names(&["a"]);
        let mapping = DefaultPropositionalMapping::new(&adf);
        mapping.true_atom(&Argument::new("z"));
    } // kcov-ignore
}
