use crate::adf::Argument;
use std::{collections::HashSet, fmt::Debug};

/// A read-only view over a set of arguments borrowed from an [`Interpretation`](super::Interpretation).
///
/// Views avoid copying the underlying sets: the argument universe of an interpretation is a view over the union of its three categories,
/// and the undecided arguments of a single-valued interpretation are a view over the shared framework universe minus one argument.
///
/// Membership tests are made in constant time.
/// Views compare equal iff they contain the same arguments, whatever their underlying representation.
#[derive(Clone, Copy)]
pub struct ArgumentsView<'a> {
    repr: ViewRepr<'a>,
}

#[derive(Clone, Copy)]
enum ViewRepr<'a> {
    Empty,
    Single(&'a Argument),
    Set(&'a HashSet<Argument>),
    // the excluded argument is a member of the set
    Without(&'a HashSet<Argument>, &'a Argument),
    // the sets are pairwise disjoint
    Union(
        &'a HashSet<Argument>,
        &'a HashSet<Argument>,
        &'a HashSet<Argument>,
    ),
}

impl<'a> ArgumentsView<'a> {
    pub(crate) fn empty() -> Self {
        Self {
            repr: ViewRepr::Empty,
        }
    }

    pub(crate) fn single(argument: &'a Argument) -> Self {
        Self {
            repr: ViewRepr::Single(argument),
        }
    }

    pub(crate) fn set(set: &'a HashSet<Argument>) -> Self {
        Self {
            repr: ViewRepr::Set(set),
        }
    }

    pub(crate) fn without(set: &'a HashSet<Argument>, excluded: &'a Argument) -> Self {
        debug_assert!(set.contains(excluded));
        Self {
            repr: ViewRepr::Without(set, excluded),
        }
    }

    pub(crate) fn union(
        s1: &'a HashSet<Argument>,
        s2: &'a HashSet<Argument>,
        s3: &'a HashSet<Argument>,
    ) -> Self {
        Self {
            repr: ViewRepr::Union(s1, s2, s3),
        }
    }

    /// Returns `true` iff the argument is in this view.
    pub fn contains(&self, argument: &Argument) -> bool {
        match self.repr {
            ViewRepr::Empty => false,
            ViewRepr::Single(a) => a == argument,
            ViewRepr::Set(s) => s.contains(argument),
            ViewRepr::Without(s, excluded) => excluded != argument && s.contains(argument),
            ViewRepr::Union(s1, s2, s3) => {
                s1.contains(argument) || s2.contains(argument) || s3.contains(argument)
            }
        }
    }

    /// Returns the number of arguments in this view.
    pub fn len(&self) -> usize {
        match self.repr {
            ViewRepr::Empty => 0,
            ViewRepr::Single(_) => 1,
            ViewRepr::Set(s) => s.len(),
            ViewRepr::Without(s, _) => s.len() - 1,
            ViewRepr::Union(s1, s2, s3) => s1.len() + s2.len() + s3.len(),
        }
    }

    /// Returns `true` iff this view has no argument.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the arguments of this view, in no particular order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &'a Argument> + 'a> {
        match self.repr {
            ViewRepr::Empty => Box::new(std::iter::empty()),
            ViewRepr::Single(a) => Box::new(std::iter::once(a)),
            ViewRepr::Set(s) => Box::new(s.iter()),
            ViewRepr::Without(s, excluded) => Box::new(s.iter().filter(move |a| *a != excluded)),
            ViewRepr::Union(s1, s2, s3) => Box::new(s1.iter().chain(s2.iter()).chain(s3.iter())),
        }
    }

    /// Returns `true` iff every argument of this view is in the other one.
    pub fn is_subset(&self, other: &ArgumentsView<'_>) -> bool {
        self.len() <= other.len() && self.iter().all(|a| other.contains(a))
    }

    /// Returns `true` iff this view and the other one share no argument.
    pub fn is_disjoint(&self, other: &ArgumentsView<'_>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|a| !other.contains(a))
        } else {
            other.iter().all(|a| !self.contains(a))
        }
    }

    /// Copies the arguments of this view into a new set.
    pub fn to_set(&self) -> HashSet<Argument> {
        self.iter().cloned().collect()
    }

    /// Returns the arguments of this view sorted by name.
    pub fn to_sorted_vec(&self) -> Vec<&'a Argument> {
        let mut arguments = self.iter().collect::<Vec<&Argument>>();
        arguments.sort_unstable();
        arguments
    }
}

impl<'a> IntoIterator for ArgumentsView<'a> {
    type Item = &'a Argument;

    type IntoIter = Box<dyn Iterator<Item = &'a Argument> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq<ArgumentsView<'_>> for ArgumentsView<'_> {
    fn eq(&self, other: &ArgumentsView<'_>) -> bool {
        self.len() == other.len() && self.iter().all(|a| other.contains(a))
    }
}

impl Eq for ArgumentsView<'_> {}

impl PartialEq<HashSet<Argument>> for ArgumentsView<'_> {
    fn eq(&self, other: &HashSet<Argument>) -> bool {
        self.len() == other.len() && self.iter().all(|a| other.contains(a))
    }
}

impl Debug for ArgumentsView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.to_sorted_vec()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(names: &[&str]) -> HashSet<Argument> {
        names.iter().map(|n| Argument::new(n)).collect()
    }

    #[test]
    fn test_without() {
        let s = set_of(&["a", "b", "c"]);
        let b = Argument::new("b");
        let view = ArgumentsView::without(&s, &b);
        assert_eq!(2, view.len());
        assert!(view.contains(&Argument::new("a")));
        assert!(!view.contains(&b));
        assert_eq!(set_of(&["a", "c"]), view.to_set());
    }

    #[test]
    fn test_union() {
        let s1 = set_of(&["a"]);
        let s2 = set_of(&[]);
        let s3 = set_of(&["b", "c"]);
        let view = ArgumentsView::union(&s1, &s2, &s3);
        assert_eq!(3, view.len());
        assert_eq!(set_of(&["a", "b", "c"]), view.to_set());
        assert!(view.contains(&Argument::new("c")));
    }

    #[test]
    fn test_equality_across_representations() {
        let s = set_of(&["a"]);
        let a = Argument::new("a");
        assert_eq!(ArgumentsView::set(&s), ArgumentsView::single(&a));
        let s2 = set_of(&["a", "b"]);
        let b = Argument::new("b");
        assert_eq!(ArgumentsView::set(&s), ArgumentsView::without(&s2, &b));
        assert_ne!(ArgumentsView::set(&s), ArgumentsView::set(&s2));
        assert_eq!(ArgumentsView::empty(), ArgumentsView::set(&HashSet::new()));
    }

    #[test]
    fn test_subset_and_disjoint() {
        let s1 = set_of(&["a"]);
        let s2 = set_of(&["a", "b"]);
        let s3 = set_of(&["c"]);
        assert!(ArgumentsView::set(&s1).is_subset(&ArgumentsView::set(&s2)));
        assert!(!ArgumentsView::set(&s2).is_subset(&ArgumentsView::set(&s1)));
        assert!(ArgumentsView::empty().is_subset(&ArgumentsView::set(&s1)));
        assert!(ArgumentsView::set(&s2).is_disjoint(&ArgumentsView::set(&s3)));
        assert!(!ArgumentsView::set(&s2).is_disjoint(&ArgumentsView::set(&s1)));
    }

    #[test]
    fn test_debug_is_sorted() {
        let s = set_of(&["c", "a", "b"]);
        assert_eq!(
            r#"{Argument("a"), Argument("b"), Argument("c")}"#,
            format!("{:?}", ArgumentsView::set(&s))
        );
    }
}
