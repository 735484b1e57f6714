//! Incremental SAT sessions driven with named propositional atoms.

mod backend;
pub use backend::BackendKind;
pub use backend::SatBackend;
pub use backend::SolveLimit;
pub use backend::SolvingResult;

mod cadical_backend;
pub use cadical_backend::CadicalBackend;
pub use cadical_backend::CadicalSatSolver;

mod external_backend;
pub use external_backend::ExternalBackend;
pub use external_backend::ExternalSatSolver;

#[cfg(test)]
pub(crate) mod fake_backend;

mod incremental_sat_solver;
pub use incremental_sat_solver::default_solver;
pub use incremental_sat_solver::IncrementalSatSolver;

mod ipasir_backend;
pub use ipasir_backend::IpasirBackend;
pub use ipasir_backend::IpasirSatSolver;

mod listener;
pub use listener::SatSolvingLogger;
pub use listener::SolvingListener;

mod literal;
pub use literal::Atom;
pub use literal::Literal;
pub use literal::Scope;

mod solver_state;
pub use solver_state::SolverState;
