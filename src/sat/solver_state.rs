use super::{Atom, Literal, SatBackend, Scope, SolveLimit, SolvingListener, SolvingResult};
use anyhow::{anyhow, Result};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};

/// An incremental solver instance, driven with propositional atoms rather than native variables.
///
/// Each atom is mapped to a native variable of the backend the first time it is used.
/// Persistent atoms keep their variable for the whole lifetime of the state,
/// while the variables of transient atoms are forgotten at each satisfiability check:
/// after a call to [`satisfiable`](Self::satisfiable), reusing a transient atom allocates a new variable.
/// Native variables are never reused.
///
/// The backend is released when the state is closed or dropped.
///
/// # Example
///
/// ```
/// # use crustadf::sat::{Atom, IncrementalSatSolver, default_solver};
/// let mut state = default_solver().create_state().unwrap();
/// let x = Atom::persistent("x");
/// let y = Atom::persistent("y");
/// state.add(&[x.positive(), y.positive()]);
/// state.assume(&x.negative());
/// let witness = state.witness().unwrap().unwrap();
/// assert!(witness.contains(&y));
/// assert!(!witness.contains(&x));
/// state.close();
/// ```
pub struct SolverState {
    backend: Box<dyn SatBackend>,
    persistent: HashMap<Atom, i32>,
    transient: HashMap<Atom, i32>,
    next_var: i32,
    assumptions: Vec<i32>,
    limit: Option<SolveLimit>,
    listeners: Vec<Box<dyn SolvingListener>>,
    n_clauses: usize,
}

impl SolverState {
    /// Builds a new state on top of the given backend.
    pub fn new(backend: Box<dyn SatBackend>) -> Self {
        Self {
            backend,
            persistent: HashMap::new(),
            transient: HashMap::new(),
            next_var: 1,
            assumptions: vec![],
            limit: None,
            listeners: vec![],
            n_clauses: 0,
        }
    }

    fn var_of(&mut self, atom: &Atom) -> i32 {
        let registry = match atom.scope() {
            Scope::Persistent => &mut self.persistent,
            Scope::Transient => &mut self.transient,
        };
        if let Some(v) = registry.get(atom) {
            return *v;
        }
        let v = self.next_var;
        self.next_var += 1;
        registry.insert(atom.clone(), v);
        v
    }

    fn native(&mut self, literal: &Literal) -> i32 {
        let v = self.var_of(literal.atom());
        if literal.is_positive() {
            v
        } else {
            -v
        }
    }

    /// Adds a clause, allocating the variables of the unseen atoms.
    ///
    /// Clauses of size one to three go through the dedicated entry points of the backend.
    pub fn add(&mut self, clause: &[Literal]) {
        let native = clause
            .iter()
            .map(|l| self.native(l))
            .collect::<Vec<i32>>();
        match native.as_slice() {
            [l] => self.backend.add_unit(*l),
            [l1, l2] => self.backend.add_binary(*l1, *l2),
            [l1, l2, l3] => self.backend.add_ternary(*l1, *l2, *l3),
            _ => self.backend.add_clause(&native),
        }
        self.n_clauses += 1;
    }

    /// Adds an assumption for the next satisfiability check only.
    pub fn assume(&mut self, literal: &Literal) {
        let l = self.native(literal);
        self.assumptions.push(l);
    }

    /// Checks the satisfiability of the clauses under the pending assumptions.
    ///
    /// The assumptions are consumed, and the transient atoms are forgotten.
    /// An error is returned if the backend failed or stopped before reaching a conclusion
    /// (see [`set_limit`](Self::set_limit)).
    pub fn satisfiable(&mut self) -> Result<bool> {
        self.transient = HashMap::new();
        for l in self.assumptions.drain(..) {
            self.backend.assume(l);
        }
        let (n_vars, n_clauses) = (self.n_vars(), self.n_clauses);
        self.listeners
            .iter()
            .for_each(|l| l.solving_start(n_vars, n_clauses));
        let result = self.backend.solve(self.limit);
        let status = result.as_ref().copied().unwrap_or(SolvingResult::Unknown);
        trace!("satisfiability check ended with {}", status.to_short_str());
        self.listeners.iter().for_each(|l| l.solving_end(&status));
        match result? {
            SolvingResult::Satisfiable => Ok(true),
            SolvingResult::Unsatisfiable => Ok(false),
            SolvingResult::Unknown => Err(anyhow!(
                "the SAT solver stopped before reaching a conclusion"
            )),
        }
    }

    /// Checks the satisfiability (see [`satisfiable`](Self::satisfiable)) and returns the persistent atoms set to true in the model, if any.
    pub fn witness(&mut self) -> Result<Option<HashSet<Atom>>> {
        if !self.satisfiable()? {
            return Ok(None);
        }
        Ok(Some(
            self.persistent
                .iter()
                .filter(|(_, v)| self.backend.value(**v) == Some(true))
                .map(|(a, _)| a.clone())
                .collect(),
        ))
    }

    /// Same as [`witness`](Self::witness), but only the atoms of the filter are considered.
    ///
    /// # Panics
    ///
    /// Panics if an atom of the filter is not a persistent atom already known by this state.
    pub fn witness_filtered<'a, I>(&mut self, filter: I) -> Result<Option<HashSet<Atom>>>
    where
        I: IntoIterator<Item = &'a Atom>,
    {
        if !self.satisfiable()? {
            return Ok(None);
        }
        Ok(Some(
            filter
                .into_iter()
                .filter(|a| match self.persistent.get(*a) {
                    Some(v) => self.backend.value(*v) == Some(true),
                    None => panic!("{} is not a registered persistent atom", a),
                })
                .cloned()
                .collect(),
        ))
    }

    /// Sets the limit applied to the next satisfiability checks (`None` to remove it).
    pub fn set_limit(&mut self, limit: Option<SolveLimit>) {
        self.limit = limit;
    }

    /// Adds a listener notified at each satisfiability check.
    pub fn add_listener(&mut self, listener: Box<dyn SolvingListener>) {
        self.listeners.push(listener);
    }

    /// Returns the number of native variables allocated so far.
    pub fn n_vars(&self) -> usize {
        (self.next_var - 1) as usize
    }

    /// Returns the number of clauses added so far.
    pub fn n_clauses(&self) -> usize {
        self.n_clauses
    }

    /// Returns the signature of the backend.
    pub fn signature(&self) -> String {
        self.backend.signature()
    }

    /// Closes this state, releasing the backend.
    pub fn close(self) {
        debug!(
            "closing solver state ({}, {} variables, {} clauses)",
            self.signature(),
            self.n_vars(),
            self.n_clauses
        );
    }
}
