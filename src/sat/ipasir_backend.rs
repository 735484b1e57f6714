use super::{IncrementalSatSolver, SatBackend, SolveLimit, SolverState, SolvingResult};
use anyhow::{anyhow, Context, Result};
use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use ipasir_loading::{IpasirSolverLoader, IpasirSolverWrapper};
use log::{debug, error};
use std::collections::HashMap;

const OWNER_GONE: &str = "the thread owning the IPASIR solvers is gone";

// The library handle shared by the loader and its solvers is not thread-safe:
// the loader and every solver it creates live on a single owner thread, driven through these requests.
enum Request {
    Create(Sender<Result<usize>>),
    Add(usize, Vec<i32>),
    Assume(usize, i32),
    Solve(usize, Sender<Result<Solved>>),
    Release(usize),
}

struct Solved {
    result: Option<bool>,
    model: Vec<Option<bool>>,
}

trait NativeInstance {
    fn add(&mut self, l: i32) -> Result<()>;

    fn assume(&mut self, l: i32) -> Result<()>;

    fn solve(&mut self) -> Result<Option<bool>>;

    fn val(&mut self, l: i32) -> Result<Option<bool>>;
}

impl NativeInstance for IpasirSolverWrapper {
    fn add(&mut self, l: i32) -> Result<()> {
        self.ipasir_add(l)
    }

    fn assume(&mut self, l: i32) -> Result<()> {
        self.ipasir_assume(l)
    }

    fn solve(&mut self) -> Result<Option<bool>> {
        self.ipasir_solve()
    }

    fn val(&mut self, l: i32) -> Result<Option<bool>> {
        self.ipasir_val(l)
    }
}

struct Instance<I> {
    native: I,
    n_vars: i32,
    failure: Option<anyhow::Error>,
}

impl<I> Instance<I>
where
    I: NativeInstance,
{
    fn new(native: I) -> Self {
        Self {
            native,
            n_vars: 0,
            failure: None,
        }
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(e) = result {
            error!("IPASIR solver failure: {:#}", e);
            self.failure.get_or_insert(e);
        }
    }

    fn add_clause(&mut self, clause: &[i32]) {
        if self.failure.is_some() {
            return;
        }
        for l in clause {
            let r = self.native.add(*l);
            self.record(r);
            self.n_vars = i32::max(self.n_vars, l.abs());
        }
        let r = self.native.add(0);
        self.record(r);
    }

    fn assume(&mut self, l: i32) {
        if self.failure.is_some() {
            return;
        }
        let r = self.native.assume(l);
        self.record(r);
        self.n_vars = i32::max(self.n_vars, l.abs());
    }

    fn solve(&mut self) -> Result<Solved> {
        if let Some(e) = &self.failure {
            return Err(anyhow!("the IPASIR solver is unusable after a failure: {:#}", e));
        }
        let result = self.native.solve()?;
        let model = if result == Some(true) {
            (1..=self.n_vars)
                .map(|v| self.native.val(v))
                .collect::<Result<Vec<Option<bool>>>>()?
        } else {
            vec![]
        };
        Ok(Solved { result, model })
    }
}

fn serve<I, F>(mut new_instance: F, requests: Receiver<Request>)
where
    I: NativeInstance,
    F: FnMut() -> Result<I>,
{
    let mut instances = HashMap::new();
    let mut next_id = 0;
    while let Ok(request) = requests.recv() {
        match request {
            Request::Create(reply) => match new_instance() {
                Ok(native) => {
                    let id = next_id;
                    next_id += 1;
                    instances.insert(id, Instance::new(native));
                    if reply.send(Ok(id)).is_err() {
                        instances.remove(&id);
                    }
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },
            Request::Add(id, clause) => {
                if let Some(i) = instances.get_mut(&id) {
                    i.add_clause(&clause)
                }
            }
            Request::Assume(id, l) => {
                if let Some(i) = instances.get_mut(&id) {
                    i.assume(l)
                }
            }
            Request::Solve(id, reply) => {
                let solved = match instances.get_mut(&id) {
                    Some(i) => i.solve(),
                    None => Err(anyhow!("no IPASIR solver with id {}", id)),
                };
                let _ = reply.send(solved);
            }
            Request::Release(id) => {
                instances.remove(&id);
            }
        }
    }
    debug!("no more IPASIR requests; releasing {} solver(s)", instances.len());
}

/// A [`SatBackend`] driving a solver loaded from an IPASIR library.
///
/// The native solver lives on the thread owning the library; this backend only holds a handle to it.
/// IPASIR solvers cannot enforce [`SolveLimit`]s; they are ignored.
pub struct IpasirBackend {
    id: usize,
    requests: Sender<Request>,
    signature: String,
    model: Vec<Option<bool>>,
}

impl IpasirBackend {
    fn request(&self, request: Request) {
        if self.requests.send(request).is_err() {
            error!("{}", OWNER_GONE);
        }
    }
}

impl SatBackend for IpasirBackend {
    fn add_clause(&mut self, clause: &[i32]) {
        self.request(Request::Add(self.id, clause.to_vec()));
    }

    fn assume(&mut self, l: i32) {
        self.request(Request::Assume(self.id, l));
    }

    fn solve(&mut self, limit: Option<SolveLimit>) -> Result<SolvingResult> {
        if let Some(l) = limit {
            debug!("ignoring limit {:?} for IPASIR solver {}", l, self.signature);
        }
        let (reply, receiver) = bounded(1);
        self.requests
            .send(Request::Solve(self.id, reply))
            .map_err(|_| anyhow!(OWNER_GONE))?;
        let solved = receiver
            .recv()
            .context(OWNER_GONE)?
            .context("IPASIR solver failed")?;
        self.model = solved.model;
        Ok(match solved.result {
            Some(true) => SolvingResult::Satisfiable,
            Some(false) => SolvingResult::Unsatisfiable,
            None => SolvingResult::Unknown,
        })
    }

    fn value(&self, var: i32) -> Option<bool> {
        if var < 1 {
            return None;
        }
        self.model.get(var as usize - 1).copied().flatten()
    }

    fn signature(&self) -> String {
        self.signature.clone()
    }
}

impl Drop for IpasirBackend {
    fn drop(&mut self) {
        let _ = self.requests.send(Request::Release(self.id));
    }
}

/// A factory of solver states backed by an IPASIR library.
///
/// The library is loaded on a dedicated thread, which stops once the factory and all its states are dropped.
pub struct IpasirSatSolver {
    requests: Sender<Request>,
    signature: String,
}

impl IpasirSatSolver {
    /// Loads the IPASIR library at the given path.
    pub fn new(library_path: &str) -> Result<Self> {
        let (requests, receiver) = unbounded();
        let (ready, ready_receiver) = bounded(1);
        let path = library_path.to_string();
        std::thread::Builder::new()
            .name("crustadf-ipasir".to_string())
            .spawn(move || {
                let loaded = IpasirSolverLoader::from_path(&path)
                    .and_then(|loader| loader.ipasir_signature().map(|s| (loader, s)));
                let loader = match loaded {
                    Ok((loader, signature)) => {
                        let _ = ready.send(Ok(signature));
                        loader
                    }
                    Err(e) => {
                        let _ = ready.send(Err(e));
                        return;
                    }
                };
                serve(|| loader.new_solver(), receiver);
            })
            .context("while spawning the IPASIR thread")?;
        let signature = ready_receiver
            .recv()
            .context(OWNER_GONE)?
            .with_context(|| format!(r#"while loading IPASIR library "{}""#, library_path))?;
        Ok(Self {
            requests,
            signature,
        })
    }

    /// Returns the signature of the IPASIR library.
    pub fn ipasir_signature(&self) -> &str {
        &self.signature
    }
}

impl IncrementalSatSolver for IpasirSatSolver {
    fn create_state(&self) -> Result<SolverState> {
        let (reply, receiver) = bounded(1);
        self.requests
            .send(Request::Create(reply))
            .map_err(|_| anyhow!(OWNER_GONE))?;
        let id = receiver
            .recv()
            .context(OWNER_GONE)?
            .context("while creating an IPASIR solver")?;
        debug!("created a new IPASIR instance ({})", self.signature);
        Ok(SolverState::new(Box::new(IpasirBackend {
            id,
            requests: self.requests.clone(),
            signature: self.signature.clone(),
            model: vec![],
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::{
        fake_backend::{BackendLog, BruteForceBackend},
        Atom,
    };
    use std::{
        sync::Arc,
        thread::{self, JoinHandle},
    };

    struct BruteForceInstance {
        backend: BruteForceBackend,
        pending: Vec<i32>,
        fail_on_add: bool,
    }

    impl NativeInstance for BruteForceInstance {
        fn add(&mut self, l: i32) -> Result<()> {
            if self.fail_on_add {
                return Err(anyhow!("ipasir_add is missing"));
            }
            if l == 0 {
                self.backend.add_clause(&std::mem::take(&mut self.pending));
            } else {
                self.pending.push(l);
            }
            Ok(())
        }

        fn assume(&mut self, l: i32) -> Result<()> {
            self.backend.assume(l);
            Ok(())
        }

        fn solve(&mut self) -> Result<Option<bool>> {
            Ok(match self.backend.solve(None)? {
                SolvingResult::Satisfiable => Some(true),
                SolvingResult::Unsatisfiable => Some(false),
                SolvingResult::Unknown => None,
            })
        }

        fn val(&mut self, l: i32) -> Result<Option<bool>> {
            Ok(self.backend.value(l))
        }
    }

    fn brute_force_factory(
        log: &Arc<BackendLog>,
        fail_on_add: bool,
    ) -> (IpasirSatSolver, JoinHandle<()>) {
        let (requests, receiver) = unbounded();
        let log = Arc::clone(log);
        let owner = thread::spawn(move || {
            serve(
                || {
                    Ok(BruteForceInstance {
                        backend: BruteForceBackend::new(Arc::clone(&log)),
                        pending: vec![],
                        fail_on_add,
                    })
                },
                receiver,
            )
        });
        let factory = IpasirSatSolver {
            requests,
            signature: "brute-force".to_string(),
        };
        (factory, owner)
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_thread_safety_without_unsafe_impls() {
        assert_send_sync::<IpasirSatSolver>();
        fn assert_send<T: Send>() {}
        assert_send::<IpasirBackend>();
    }

    #[test]
    fn test_missing_library() {
        let err = IpasirSatSolver::new("/this/library/does/not/exist.so")
            .err()
            .unwrap();
        assert_eq!(
            r#"while loading IPASIR library "/this/library/does/not/exist.so""#,
            err.to_string()
        );
    }

    #[test]
    fn test_solve_on_owner_thread() {
        let log = Arc::new(BackendLog::default());
        let (factory, owner) = brute_force_factory(&log, false);
        let mut state = factory.create_state().unwrap();
        assert_eq!("brute-force", state.signature());
        let x = Atom::persistent("x");
        let y = Atom::persistent("y");
        state.add(&[x.negative()]);
        state.add(&[x.positive(), y.positive()]);
        assert_eq!(
            Some([y.clone()].into_iter().collect()),
            state.witness().unwrap()
        );
        state.assume(&y.negative());
        assert!(!state.satisfiable().unwrap());
        assert!(state.satisfiable().unwrap());
        state.close();
        drop(factory);
        owner.join().unwrap();
        assert_eq!(1, log.releases());
    }

    #[test]
    fn test_release_is_ordered_before_next_creation() {
        let log = Arc::new(BackendLog::default());
        let (factory, owner) = brute_force_factory(&log, false);
        let first = factory.create_state().unwrap();
        let second = factory.create_state().unwrap();
        first.close();
        let third = factory.create_state().unwrap();
        assert_eq!(1, log.releases());
        drop(second);
        drop(third);
        drop(factory);
        owner.join().unwrap();
        assert_eq!(3, log.releases());
    }

    #[test]
    fn test_native_failure_is_reported_by_the_next_check() {
        let log = Arc::new(BackendLog::default());
        let (factory, owner) = brute_force_factory(&log, true);
        let mut state = factory.create_state().unwrap();
        state.add(&[Atom::persistent("x").positive()]);
        let err = state.satisfiable().err().unwrap();
        assert_eq!("IPASIR solver failed", err.to_string());
        assert!(format!("{:#}", err).contains("ipasir_add is missing"));
        drop(state);
        drop(factory);
        owner.join().unwrap();
    }

    #[test]
    fn test_state_outlives_factory() {
        let log = Arc::new(BackendLog::default());
        let (factory, owner) = brute_force_factory(&log, false);
        let mut state = factory.create_state().unwrap();
        drop(factory);
        state.add(&[Atom::persistent("x").positive()]);
        assert!(state.satisfiable().unwrap());
        state.close();
        owner.join().unwrap();
        assert_eq!(1, log.releases());
    }
}
