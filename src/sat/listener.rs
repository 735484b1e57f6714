use super::SolvingResult;
use log::info;

/// A trait for objects listening to the satisfiability checks of a [`SolverState`](super::SolverState).
pub trait SolvingListener: Send {
    /// Called before the backend is launched.
    fn solving_start(&self, n_vars: usize, n_clauses: usize);

    /// Called after the backend returned.
    ///
    /// The result is [`SolvingResult::Unknown`] if the backend failed.
    fn solving_end(&self, result: &SolvingResult);
}

/// A listener logging the satisfiability checks.
#[derive(Default)]
pub struct SatSolvingLogger;

impl SolvingListener for SatSolvingLogger {
    fn solving_start(&self, n_vars: usize, n_clauses: usize) {
        info!(
            "launching SAT solver on an instance with {} variables and {} clauses",
            n_vars, n_clauses
        );
    }

    fn solving_end(&self, result: &SolvingResult) {
        info!("SAT solver ended with result {}", result.to_short_str());
    }
}
