use super::{IncrementalSatSolver, SatBackend, SolveLimit, SolverState, SolvingResult};
use anyhow::{anyhow, Result};
use cadical::Solver as CadicalCSolver;
use log::debug;

/// A [`SatBackend`] wrapping the embedded CaDiCaL solver.
pub struct CadicalBackend {
    solver: CadicalCSolver,
    assumptions: Vec<i32>,
}

impl CadicalBackend {
    /// Builds a new CaDiCaL instance, using the named configuration if any.
    ///
    /// The available configurations are the ones of CaDiCaL (`default`, `plain`, `sat`, `unsat`).
    pub fn new(config: Option<&str>) -> Result<Self> {
        let solver = match config {
            None => CadicalCSolver::new(),
            Some(c) => CadicalCSolver::with_config(c)
                .map_err(|e| anyhow!(r#"cannot apply CaDiCaL configuration "{}": {:?}"#, c, e))?,
        };
        Ok(Self {
            solver,
            assumptions: vec![],
        })
    }

    fn apply_limit(&mut self, limit: SolveLimit) -> Result<()> {
        let (name, value) = match limit {
            SolveLimit::Conflicts(n) => ("conflicts", n),
            SolveLimit::Decisions(n) => ("decisions", n),
        };
        self.solver
            .set_limit(name, i32::try_from(value).unwrap_or(i32::MAX))
            .map_err(|e| anyhow!("cannot set CaDiCaL {} limit: {:?}", name, e))
    }
}

impl SatBackend for CadicalBackend {
    fn add_clause(&mut self, clause: &[i32]) {
        self.solver.add_clause(clause.iter().copied())
    }

    fn assume(&mut self, l: i32) {
        self.assumptions.push(l)
    }

    fn solve(&mut self, limit: Option<SolveLimit>) -> Result<SolvingResult> {
        if let Some(l) = limit {
            self.apply_limit(l)?;
        }
        let assumptions = std::mem::take(&mut self.assumptions);
        Ok(match self.solver.solve_with(assumptions.into_iter()) {
            Some(true) => SolvingResult::Satisfiable,
            Some(false) => SolvingResult::Unsatisfiable,
            None => SolvingResult::Unknown,
        })
    }

    fn value(&self, var: i32) -> Option<bool> {
        if var < 1 || var > self.solver.max_variable() {
            return None;
        }
        self.solver.value(var)
    }

    fn signature(&self) -> String {
        self.solver.signature().to_string()
    }
}

/// A factory of solver states backed by CaDiCaL.
#[derive(Default)]
pub struct CadicalSatSolver {
    config: Option<String>,
}

impl CadicalSatSolver {
    /// Builds a factory for CaDiCaL instances using the given configuration.
    pub fn with_config(config: &str) -> Self {
        Self {
            config: Some(config.to_string()),
        }
    }
}

impl IncrementalSatSolver for CadicalSatSolver {
    fn create_state(&self) -> Result<SolverState> {
        let backend = CadicalBackend::new(self.config.as_deref())?;
        debug!("created a new CaDiCaL instance ({})", backend.signature());
        Ok(SolverState::new(Box::new(backend)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sat() {
        let mut s = CadicalBackend::new(None).unwrap();
        s.add_clause(&[-1, 2]);
        assert_eq!(SolvingResult::Satisfiable, s.solve(None).unwrap());
        assert!(s.value(1) == Some(false) || s.value(2) == Some(true));
    }

    #[test]
    fn test_unsat() {
        let mut s = CadicalBackend::new(None).unwrap();
        s.add_binary(-1, 2);
        s.add_binary(-1, -2);
        s.add_unit(1);
        assert_eq!(SolvingResult::Unsatisfiable, s.solve(None).unwrap());
    }

    #[test]
    fn test_iterative() {
        let mut s = CadicalBackend::new(None).unwrap();
        s.add_clause(&[-1, 2]);
        assert_eq!(SolvingResult::Satisfiable, s.solve(None).unwrap());
        s.add_clause(&[1, 3]);
        s.add_clause(&[-2, 3]);
        assert_eq!(SolvingResult::Satisfiable, s.solve(None).unwrap());
        assert_eq!(Some(true), s.value(3));
        s.add_clause(&[-3]);
        assert_eq!(SolvingResult::Unsatisfiable, s.solve(None).unwrap());
    }

    #[test]
    fn test_assumptions_are_discarded() {
        let mut s = CadicalBackend::new(None).unwrap();
        s.add_unit(1);
        s.assume(-1);
        assert_eq!(SolvingResult::Unsatisfiable, s.solve(None).unwrap());
        assert_eq!(SolvingResult::Satisfiable, s.solve(None).unwrap());
    }

    #[test]
    fn test_unknown_variable_has_no_value() {
        let mut s = CadicalBackend::new(None).unwrap();
        s.add_unit(1);
        s.solve(None).unwrap();
        assert_eq!(None, s.value(2));
        assert_eq!(None, s.value(0));
    }

    #[test]
    fn test_with_config() {
        let mut s = CadicalBackend::new(Some("plain")).unwrap();
        s.add_ternary(1, 2, 3);
        assert_eq!(SolvingResult::Satisfiable, s.solve(None).unwrap());
    }

    #[test]
    fn test_unknown_config() {
        assert!(CadicalBackend::new(Some("foo")).is_err());
    }

    #[test]
    fn test_factory() {
        let mut state = CadicalSatSolver::default().create_state().unwrap();
        assert!(state.satisfiable().unwrap());
        state.close();
    }
}
