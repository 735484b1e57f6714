use super::{SatBackend, SolveLimit, SolvingResult};
use anyhow::Result;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// What happened to a [`BruteForceBackend`], shared with the test that created it.
#[derive(Default)]
pub(crate) struct BackendLog {
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) releases: AtomicUsize,
}

impl BackendLog {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call)
    }
}

/// A backend enumerating all the assignments, for tests on tiny instances.
pub(crate) struct BruteForceBackend {
    clauses: Vec<Vec<i32>>,
    assumptions: Vec<i32>,
    model: Vec<bool>,
    forced_result: Option<SolvingResult>,
    log: Arc<BackendLog>,
}

impl BruteForceBackend {
    pub(crate) fn new(log: Arc<BackendLog>) -> Self {
        Self {
            clauses: vec![],
            assumptions: vec![],
            model: vec![],
            forced_result: None,
            log,
        }
    }

    pub(crate) fn with_forced_result(log: Arc<BackendLog>, result: SolvingResult) -> Self {
        let mut backend = Self::new(log);
        backend.forced_result = Some(result);
        backend
    }

    fn n_vars(&self) -> usize {
        self.clauses
            .iter()
            .flatten()
            .chain(self.assumptions.iter())
            .map(|l| l.unsigned_abs() as usize)
            .max()
            .unwrap_or(0)
    }
}

fn lit_value(assignment: &[bool], l: i32) -> bool {
    assignment[l.unsigned_abs() as usize - 1] == (l > 0)
}

impl SatBackend for BruteForceBackend {
    fn add_clause(&mut self, clause: &[i32]) {
        self.log.push(format!("clause {:?}", clause));
        self.clauses.push(clause.to_vec());
    }

    fn add_unit(&mut self, l: i32) {
        self.log.push(format!("unit {}", l));
        self.clauses.push(vec![l]);
    }

    fn add_binary(&mut self, l1: i32, l2: i32) {
        self.log.push(format!("binary {} {}", l1, l2));
        self.clauses.push(vec![l1, l2]);
    }

    fn add_ternary(&mut self, l1: i32, l2: i32, l3: i32) {
        self.log.push(format!("ternary {} {} {}", l1, l2, l3));
        self.clauses.push(vec![l1, l2, l3]);
    }

    fn assume(&mut self, l: i32) {
        self.log.push(format!("assume {}", l));
        self.assumptions.push(l);
    }

    fn solve(&mut self, limit: Option<SolveLimit>) -> Result<SolvingResult> {
        self.log.push(format!("solve {:?}", limit));
        let assumptions = std::mem::take(&mut self.assumptions);
        if let Some(r) = self.forced_result {
            return Ok(r);
        }
        let n_vars = self.n_vars().max(
            assumptions
                .iter()
                .map(|l| l.unsigned_abs() as usize)
                .max()
                .unwrap_or(0),
        );
        for bits in 0..(1u64 << n_vars) {
            let assignment = (0..n_vars)
                .map(|i| (bits >> i) & 1 == 1)
                .collect::<Vec<bool>>();
            let sat = assumptions.iter().all(|l| lit_value(&assignment, *l))
                && self
                    .clauses
                    .iter()
                    .all(|cl| cl.iter().any(|l| lit_value(&assignment, *l)));
            if sat {
                self.model = assignment;
                return Ok(SolvingResult::Satisfiable);
            }
        }
        self.model.clear();
        Ok(SolvingResult::Unsatisfiable)
    }

    fn value(&self, var: i32) -> Option<bool> {
        self.model.get(var as usize - 1).copied()
    }

    fn signature(&self) -> String {
        "brute-force".to_string()
    }
}

impl Drop for BruteForceBackend {
    fn drop(&mut self) {
        self.log.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_result() {
        let log = Arc::new(BackendLog::default());
        let mut backend =
            BruteForceBackend::with_forced_result(Arc::clone(&log), SolvingResult::Unknown);
        backend.add_unit(1);
        assert_eq!(SolvingResult::Unknown, backend.solve(None).unwrap());
        assert_eq!(vec!["unit 1", "solve None"], log.calls());
        drop(backend);
        assert_eq!(1, log.releases());
    }
}
