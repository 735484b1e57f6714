use std::{fmt::Display, ops::Not, sync::Arc};

/// The lifetime of an atom inside a [`SolverState`](super::SolverState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The atom survives across satisfiability checks and is visible in witnesses.
    Persistent,
    /// The atom is only valid until the next satisfiability check.
    Transient,
}

/// A propositional atom, as seen by the encodings.
///
/// An atom is identified by its name and its [`Scope`].
/// Since the scope is part of the identity, an atom can never change its scope:
/// a persistent atom and a transient atom sharing the same name are two different atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    name: Arc<str>,
    scope: Scope,
}

impl Atom {
    /// Builds a new persistent atom.
    ///
    /// # Example
    ///
    /// ```
    /// # use crustadf::sat::{Atom, Scope};
    /// let a = Atom::persistent("a");
    /// assert_eq!(Scope::Persistent, a.scope());
    /// assert_ne!(Atom::transient("a"), a);
    /// ```
    pub fn persistent(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            scope: Scope::Persistent,
        }
    }

    /// Builds a new transient atom.
    pub fn transient(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            scope: Scope::Transient,
        }
    }

    /// Returns the name of this atom.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scope of this atom.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Returns `true` iff this atom is transient.
    pub fn is_transient(&self) -> bool {
        self.scope == Scope::Transient
    }

    /// Returns the positive literal of this atom.
    pub fn positive(&self) -> Literal {
        Literal {
            atom: self.clone(),
            positive: true,
        }
    }

    /// Returns the negative literal of this atom.
    pub fn negative(&self) -> Literal {
        Literal {
            atom: self.clone(),
            positive: false,
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A literal, i.e. an atom with a polarity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    atom: Atom,
    positive: bool,
}

impl Literal {
    /// Returns the atom of this literal.
    pub fn atom(&self) -> &Atom {
        &self.atom
    }

    /// Returns `true` iff this literal is the positive literal of its atom.
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// Returns the opposite literal.
    pub fn negate(&self) -> Self {
        Self {
            atom: self.atom.clone(),
            positive: !self.positive,
        }
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Self {
            atom: self.atom,
            positive: !self.positive,
        }
    }
}

impl From<Atom> for Literal {
    fn from(atom: Atom) -> Self {
        Self {
            atom,
            positive: true,
        }
    }
}

impl From<&Atom> for Literal {
    fn from(atom: &Atom) -> Self {
        atom.positive()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.positive {
            write!(f, "{}", self.atom)
        } else {
            write!(f, "-{}", self.atom)
        }
    }
}

/// Builds a clause from a list of literals (or atoms, taken as positive literals).
#[macro_export]
macro_rules! clause {
    () => (
        vec![] as Vec<$crate::sat::Literal>
    );
    ($($x:expr),+ $(,)?) => (
        [$($x),+].into_iter().map($crate::sat::Literal::from).collect::<Vec<$crate::sat::Literal>>()
    );
}
