use super::Interpretation;
use crate::adf::Argument;
use anyhow::{bail, Result};
use std::collections::HashMap;

/// A builder for [`Interpretation`] objects.
///
/// The universe of the builder is fixed at its creation, and all its arguments are initially undecided.
/// The builder can be reused after a call to [`build`](Self::build).
///
/// # Example
///
/// ```
/// # use crustadf::adf::ArgumentSet;
/// # use crustadf::interpretation::Interpretation;
/// let adf = ArgumentSet::new_with_names(&["a", "b", "c"]);
/// let a = adf.get_argument("a").unwrap();
/// let b = adf.get_argument("b").unwrap();
/// let i = Interpretation::builder(&adf)
///     .satisfied(a)
///     .unwrap()
///     .unsatisfied(b)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!("{t(a) f(b) u(c)}", i.to_string());
/// ```
#[derive(Clone, Debug)]
pub struct InterpretationBuilder {
    assignment: HashMap<Argument, Option<bool>>,
}

impl InterpretationBuilder {
    pub(crate) fn new<'a, I>(arguments: I) -> Self
    where
        I: IntoIterator<Item = &'a Argument>,
    {
        Self {
            assignment: arguments.into_iter().map(|a| (a.clone(), None)).collect(),
        }
    }

    /// Sets the value of an argument (`None` for undecided).
    ///
    /// An error is returned if the argument is not in the universe of the builder.
    pub fn put(&mut self, argument: &Argument, value: Option<bool>) -> Result<&mut Self> {
        match self.assignment.get_mut(argument) {
            Some(v) => *v = value,
            None => bail!("the argument {} is unknown to this builder", argument),
        }
        Ok(self)
    }

    /// Sets an argument as satisfied.
    pub fn satisfied(&mut self, argument: &Argument) -> Result<&mut Self> {
        self.put(argument, Some(true))
    }

    /// Sets an argument as unsatisfied.
    pub fn unsatisfied(&mut self, argument: &Argument) -> Result<&mut Self> {
        self.put(argument, Some(false))
    }

    /// Sets an argument as undecided.
    pub fn undecided(&mut self, argument: &Argument) -> Result<&mut Self> {
        self.put(argument, None)
    }

    /// Builds the interpretation.
    ///
    /// An error is returned if the universe of the builder is empty.
    pub fn build(&self) -> Result<Interpretation> {
        Interpretation::from_map(self.assignment.clone())
    }
}
