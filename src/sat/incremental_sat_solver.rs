use super::SolverState;
use anyhow::Result;

/// A factory of [`SolverState`]s.
///
/// Each call to [`create_state`](Self::create_state) returns a fresh and independent solver instance.
/// Factories are shared between threads, so they must be [`Send`] and [`Sync`].
pub trait IncrementalSatSolver: Send + Sync {
    /// Creates a new solver state.
    fn create_state(&self) -> Result<SolverState>;
}

/// Returns the default factory, which relies on the embedded CaDiCaL solver.
pub fn default_solver() -> Box<dyn IncrementalSatSolver> {
    Box::<super::CadicalSatSolver>::default()
}
