use anyhow::Result;
use strum_macros::{Display, EnumIter, EnumString, EnumVariantNames};

/// The result of a call to a SAT backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvingResult {
    /// The problem is satisfiable; the model can be queried through [`SatBackend::value`].
    Satisfiable,
    /// The problem is unsatisfiable.
    Unsatisfiable,
    /// The backend stopped before reaching a conclusion (limit reached, interruption).
    Unknown,
}

impl SolvingResult {
    /// Returns a short string describing the result.
    pub fn to_short_str(&self) -> &str {
        match self {
            SolvingResult::Satisfiable => "SAT",
            SolvingResult::Unsatisfiable => "UNSAT",
            SolvingResult::Unknown => "UNKNOWN",
        }
    }
}

/// A limit on the effort a backend may spend in a single satisfiability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveLimit {
    /// Limits the number of conflicts.
    Conflicts(u32),
    /// Limits the number of decisions.
    Decisions(u32),
}

/// The narrow interface a SAT backend must provide to be driven by a [`SolverState`](super::SolverState).
///
/// Literals are non-null integers, negative integers denoting negative literals (as in DIMACS and IPASIR).
/// The variables are allocated by the caller, starting at 1.
///
/// Creating a backend creates the underlying solver instance,
/// and dropping it releases the instance; implementations must release it in their [`Drop`] implementation (if any) and nowhere else.
pub trait SatBackend: Send {
    /// Adds a clause.
    fn add_clause(&mut self, clause: &[i32]);

    /// Adds a unit clause.
    ///
    /// Backends with a dedicated entry point may override this function;
    /// the observable behavior must be the one of [`add_clause`](Self::add_clause).
    fn add_unit(&mut self, l: i32) {
        self.add_clause(&[l])
    }

    /// Adds a binary clause (see [`add_unit`](Self::add_unit)).
    fn add_binary(&mut self, l1: i32, l2: i32) {
        self.add_clause(&[l1, l2])
    }

    /// Adds a ternary clause (see [`add_unit`](Self::add_unit)).
    fn add_ternary(&mut self, l1: i32, l2: i32, l3: i32) {
        self.add_clause(&[l1, l2, l3])
    }

    /// Adds an assumption for the next call to [`solve`](Self::solve) only.
    fn assume(&mut self, l: i32);

    /// Checks the satisfiability of the clauses under the current assumptions, which are then discarded.
    ///
    /// An optional limit may be given; backends that cannot enforce it just ignore it.
    /// An error is returned if the backend itself failed.
    fn solve(&mut self, limit: Option<SolveLimit>) -> Result<SolvingResult>;

    /// Returns the value of the variable in the model found by the last call to [`solve`](Self::solve).
    ///
    /// `None` is returned if the value is unknown.
    fn value(&self, var: i32) -> Option<bool>;

    /// Returns a string identifying the backend.
    fn signature(&self) -> String;
}

/// The kind of backends provided by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, EnumVariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    /// The embedded CaDiCaL solver (see [`CadicalSatSolver`](super::CadicalSatSolver)).
    Cadical,
    /// A solver loaded from an IPASIR library (see [`IpasirSatSolver`](super::IpasirSatSolver)).
    Ipasir,
    /// An external solver executable (see [`ExternalSatSolver`](super::ExternalSatSolver)).
    External,
}
