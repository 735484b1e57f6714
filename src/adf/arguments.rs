use anyhow::{anyhow, Result};
use std::{
    borrow::Borrow,
    collections::HashSet,
    fmt::Display,
    sync::Arc,
};

/// An argument of an abstract dialectical framework.
///
/// Arguments are opaque and immutable.
/// Two arguments are equal iff they have the same name.
/// Cloning an argument is cheap since the name is shared.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Argument(Arc<str>);

impl Argument {
    /// Builds a new argument given its name.
    ///
    /// # Example
    ///
    /// ```
    /// # use crustadf::adf::Argument;
    /// let a = Argument::new("a");
    /// assert_eq!("a", a.name());
    /// assert_eq!(Argument::new("a"), a);
    /// ```
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Returns the name of the argument.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for Argument {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Argument {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Argument {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

/// The ordered set of arguments of a framework.
///
/// This is the universe interpretations are built against when they are built "in the context of a framework".
/// The insertion order is kept, and the membership set is shared with the interpretations that need it,
/// so building an interpretation over the whole universe does not copy it.
#[derive(Clone, Debug, Default)]
pub struct ArgumentSet {
    arguments: Vec<Argument>,
    membership: Arc<HashSet<Argument>>,
}

impl ArgumentSet {
    /// Builds a new argument set given the names of the arguments.
    ///
    /// If a name appears multiple times, the first occurrence is the only one that is considered.
    ///
    /// # Example
    ///
    /// ```
    /// # use crustadf::adf::ArgumentSet;
    /// let arguments = ArgumentSet::new_with_names(&["a", "b", "c", "a"]);
    /// assert_eq!(3, arguments.len());
    /// ```
    pub fn new_with_names<S>(names: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        names
            .iter()
            .map(|n| Argument::new(n.as_ref()))
            .collect()
    }

    /// Adds a new argument to this set.
    ///
    /// If an argument with the same name is already present, nothing is added.
    pub fn new_argument(&mut self, argument: Argument) {
        if Arc::make_mut(&mut self.membership).insert(argument.clone()) {
            self.arguments.push(argument);
        }
    }

    /// Returns the number of arguments in the set.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Returns `true` iff the set has no argument.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Returns `true` iff the argument belongs to this set.
    pub fn contains(&self, argument: &Argument) -> bool {
        self.membership.contains(argument)
    }

    /// Returns the argument with the given name.
    ///
    /// If no such argument exists, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// # use crustadf::adf::ArgumentSet;
    /// let arguments = ArgumentSet::new_with_names(&["a", "b", "c"]);
    /// assert!(arguments.get_argument("a").is_ok());
    /// assert!(arguments.get_argument("d").is_err());
    /// ```
    pub fn get_argument(&self, name: &str) -> Result<&Argument> {
        self.membership
            .get(name)
            .ok_or_else(|| anyhow!("no such argument: {}", name))
    }

    /// Returns an iterator to the arguments, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Argument> + '_ {
        self.arguments.iter()
    }

    /// Returns the arguments as a slice, in insertion order.
    pub fn as_slice(&self) -> &[Argument] {
        &self.arguments
    }

    pub(crate) fn shared_membership(&self) -> &Arc<HashSet<Argument>> {
        &self.membership
    }
}

impl FromIterator<Argument> for ArgumentSet {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        let mut argument_set = ArgumentSet::default();
        iter.into_iter()
            .for_each(|a| argument_set.new_argument(a));
        argument_set.arguments.shrink_to_fit();
        argument_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_names() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let args = ArgumentSet::new_with_names(&names);
        assert_eq!(3, args.len());
        assert!(!args.is_empty());
        for (i, a) in args.iter().enumerate() {
            assert_eq!(names[i], a.name());
        }
    }

    #[test]
    fn test_new_with_empty_names() {
        let args = ArgumentSet::new_with_names(&[] as &[&str]);
        assert_eq!(0, args.len());
        assert!(args.is_empty());
    }

    #[test]
    fn test_new_repeated_names() {
        let args = ArgumentSet::new_with_names(&["a", "b", "a"]);
        assert_eq!(2, args.len());
        assert_eq!(vec!["a", "b"], args.iter().map(|a| a.name()).collect::<Vec<_>>());
    }

    #[test]
    fn test_add_arguments() {
        let mut args = ArgumentSet::new_with_names(&["a", "b"]);
        let shared = Arc::clone(args.shared_membership());
        args.new_argument(Argument::new("c"));
        args.new_argument(Argument::new("c"));
        assert_eq!(3, args.len());
        assert!(args.contains(&Argument::new("c")));
        assert_eq!(2, shared.len());
    }

    #[test]
    #[should_panic(expected = "no such argument: d")]
    fn test_get_nonexisting_argument() {
        let args = ArgumentSet::new_with_names(&["a", "b"]);
        args.get_argument("d").unwrap();
    }

    #[test]
    fn test_argument_identity_is_name() {
        assert_eq!(Argument::from("a"), Argument::from("a".to_string()));
        assert_ne!(Argument::from("a"), Argument::from("b"));
        assert_eq!("a", Argument::new("a").to_string());
    }
}
