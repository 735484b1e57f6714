use super::{InlineTaskSource, Task, TaskSource, WorkerThreads};
use crate::sat::{IncrementalSatSolver, SolverState};
use anyhow::{anyhow, bail, Context, Result};
use crossbeam::channel::{bounded, select, Receiver, Sender};
use log::{debug, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

const POOL_CLOSED: &str = "the pool is closed";

type Decorator = dyn Fn(SolverState) -> SolverState + Send + Sync;

struct Shared {
    factory: Arc<dyn IncrementalSatSolver>,
    decorator: Option<Box<Decorator>>,
    sender: Sender<Result<SolverState>>,
    receiver: Receiver<Result<SolverState>>,
    closed: AtomicBool,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn create(&self) -> Result<SolverState> {
        let state = self.factory.create_state()?;
        Ok(match &self.decorator {
            Some(d) => d(state),
            None => state,
        })
    }

    fn creation_task(shared: Arc<Shared>) -> Task {
        Box::new(move || {
            let item = shared.create();
            if let Err(e) = &item {
                warn!("failed to create a solver state: {:#}", e);
            }
            if shared.is_closed() {
                if let Ok(state) = item {
                    state.close();
                }
                return;
            }
            if shared.sender.send(item).is_err() {
                return;
            }
            // the pool may have been drained before the state was buffered
            if shared.is_closed() {
                while let Ok(item) = shared.receiver.try_recv() {
                    if let Ok(state) = item {
                        state.close();
                    }
                }
            }
        })
    }
}

/// A pool of solver states, prepared in the background.
///
/// A pool keeps a bounded buffer of ready states (or of creation failures).
/// Taking a state with [`create_state`](IncrementalSatSolver::create_state) blocks until one is available,
/// and schedules the creation of exactly one replacement.
/// Since a pool is itself an [`IncrementalSatSolver`], it can be used wherever a factory is expected.
///
/// Closing the pool (explicitly or by dropping it) makes the following takes fail, and closes the buffered states.
/// The states already handed out are not affected.
///
/// # Example
///
/// ```
/// # use crustadf::pool::PoolBuilder;
/// # use crustadf::sat::{Atom, IncrementalSatSolver, CadicalSatSolver};
/// # use std::sync::Arc;
/// let pool = PoolBuilder::new(Arc::new(CadicalSatSolver::default()), 2)
///     .decorator(|mut state| {
///         state.add(&[Atom::persistent("x").positive()]);
///         state
///     })
///     .build()
///     .unwrap();
/// let mut state = pool.create_state().unwrap();
/// assert!(state.witness().unwrap().unwrap().contains(&Atom::persistent("x")));
/// pool.close();
/// assert!(pool.create_state().is_err());
/// ```
pub struct Pool {
    shared: Arc<Shared>,
    close_signal: Mutex<Option<Sender<()>>>,
    close_receiver: Receiver<()>,
    task_source: Box<dyn TaskSource>,
    capacity: usize,
}

impl Pool {
    /// Builds a pool with the default settings (see [`PoolBuilder`]).
    pub fn new(factory: Arc<dyn IncrementalSatSolver>, capacity: usize) -> Result<Self> {
        PoolBuilder::new(factory, capacity).build()
    }

    /// Returns the number of states this pool keeps ready.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of items currently buffered.
    pub fn available(&self) -> usize {
        self.shared.receiver.len()
    }

    /// Returns `true` iff this pool has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    fn schedule_creation(&self) {
        self.task_source
            .execute(Shared::creation_task(Arc::clone(&self.shared)))
    }

    /// Closes this pool.
    ///
    /// The buffered states are closed on the task source; the creations in progress close their product.
    /// Closing a closed pool has no effect.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("closing a pool of capacity {}", self.capacity);
        if let Ok(mut signal) = self.close_signal.lock() {
            signal.take();
        }
        while let Ok(item) = self.shared.receiver.try_recv() {
            if let Ok(state) = item {
                self.task_source.execute(Box::new(move || state.close()));
            }
        }
    }
}

impl IncrementalSatSolver for Pool {
    fn create_state(&self) -> Result<SolverState> {
        if self.is_closed() {
            bail!(POOL_CLOSED)
        }
        let item = select! {
            recv(self.shared.receiver) -> item => item.context("the pool buffer is disconnected")?,
            recv(self.close_receiver) -> _ => bail!(POOL_CLOSED),
        };
        if self.is_closed() {
            if let Ok(state) = item {
                state.close();
            }
            bail!(POOL_CLOSED)
        }
        self.schedule_creation();
        item.context("the pool failed to create a solver state")
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.close()
    }
}

/// A builder for [`Pool`]s.
///
/// By default, the states are created by a single dedicated worker thread and are not decorated.
pub struct PoolBuilder {
    factory: Arc<dyn IncrementalSatSolver>,
    capacity: usize,
    workers: usize,
    task_source: Option<Box<dyn TaskSource>>,
    decorator: Option<Box<Decorator>>,
}

impl PoolBuilder {
    /// Starts building a pool of the given capacity on top of a factory.
    pub fn new(factory: Arc<dyn IncrementalSatSolver>, capacity: usize) -> Self {
        Self {
            factory,
            capacity,
            workers: 1,
            task_source: None,
            decorator: None,
        }
    }

    /// Sets the number of dedicated worker threads.
    ///
    /// This setting is ignored if a task source is given.
    pub fn workers(mut self, n_workers: usize) -> Self {
        self.workers = n_workers;
        self
    }

    /// Sets the task source used to create and close the states.
    pub fn task_source(mut self, task_source: Box<dyn TaskSource>) -> Self {
        self.task_source = Some(task_source);
        self
    }

    /// Makes the states created in the current thread.
    pub fn inline(self) -> Self {
        self.task_source(Box::new(InlineTaskSource))
    }

    /// Sets a function applied to each fresh state before it is buffered.
    pub fn decorator<F>(mut self, decorator: F) -> Self
    where
        F: Fn(SolverState) -> SolverState + Send + Sync + 'static,
    {
        self.decorator = Some(Box::new(decorator));
        self
    }

    /// Builds the pool and schedules the creation of its states.
    pub fn build(self) -> Result<Pool> {
        if self.capacity == 0 {
            return Err(anyhow!("the capacity of a pool must be strictly positive"));
        }
        let task_source = match self.task_source {
            Some(t) => t,
            None => Box::new(WorkerThreads::new(self.workers)?),
        };
        let (sender, receiver) = bounded(self.capacity);
        let (close_signal, close_receiver) = bounded(0);
        let pool = Pool {
            shared: Arc::new(Shared {
                factory: self.factory,
                decorator: self.decorator,
                sender,
                receiver,
                closed: AtomicBool::new(false),
            }),
            close_signal: Mutex::new(Some(close_signal)),
            close_receiver,
            task_source,
            capacity: self.capacity,
        };
        debug!("created a pool of capacity {}", pool.capacity);
        for _ in 0..pool.capacity {
            pool.schedule_creation();
        }
        Ok(pool)
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
        sync::atomic::AtomicUsize,
        thread,
        time::Duration,
    };

    #[derive(Default)]
    struct CountingFactory {
        created: AtomicUsize,
        log: Arc<BackendLog>,
    }

    impl CountingFactory {
        fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }

        fn releases(&self) -> usize {
            self.log.releases()
        }
    }

    impl IncrementalSatSolver for CountingFactory {
        fn create_state(&self) -> Result<SolverState> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(SolverState::new(Box::new(BruteForceBackend::new(
                Arc::clone(&self.log),
            ))))
        }
    }

    struct FailingFactory;

    impl IncrementalSatSolver for FailingFactory {
        fn create_state(&self) -> Result<SolverState> {
            Err(anyhow!("no solver available"))
        }
    }

    #[derive(Default)]
    struct StalledTaskSource {
        tasks: Mutex<Vec<Task>>,
    }

    impl TaskSource for StalledTaskSource {
        fn execute(&self, task: Task) {
            self.tasks.lock().unwrap().push(task)
        }
    }

    #[test]
    fn test_capacity_zero() {
        let factory = Arc::new(CountingFactory::default());
        assert_eq!(
            "the capacity of a pool must be strictly positive",
            Pool::new(factory.clone(), 0).err().unwrap().to_string()
        );
        assert_eq!(0, factory.created());
    }

    #[test]
    fn test_initial_fill() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 3).inline().build().unwrap();
        assert_eq!(3, factory.created());
        assert_eq!(3, pool.available());
        assert_eq!(3, pool.capacity());
    }

    #[test]
    fn test_take_schedules_one_replacement() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 2).inline().build().unwrap();
        let mut states = vec![];
        for i in 1..=5 {
            states.push(pool.create_state().unwrap());
            assert_eq!(2 + i, factory.created());
            assert_eq!(2, pool.available());
        }
        assert_eq!(0, factory.releases());
    }

    #[test]
    fn test_take_with_worker_threads() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 2)
            .workers(2)
            .build()
            .unwrap();
        let mut states = (0..5)
            .map(|_| pool.create_state().unwrap())
            .collect::<Vec<SolverState>>();
        assert!(states.iter_mut().all(|s| s.satisfiable().unwrap()));
        drop(pool);
        assert_eq!(7, factory.created());
        assert_eq!(2, factory.releases());
        drop(states);
        assert_eq!(7, factory.releases());
    }

    #[test]
    fn test_closed_pool_fails() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 2).inline().build().unwrap();
        pool.close();
        assert!(pool.is_closed());
        assert_eq!(
            "the pool is closed",
            pool.create_state().err().unwrap().to_string()
        );
        pool.close();
        assert_eq!(2, factory.created());
    }

    #[test]
    fn test_close_releases_buffered_states_once() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 3).inline().build().unwrap();
        pool.close();
        assert_eq!(3, factory.releases());
        assert_eq!(0, pool.available());
        drop(pool);
        assert_eq!(3, factory.releases());
    }

    #[test]
    fn test_close_does_not_touch_taken_states() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 3).inline().build().unwrap();
        let mut state = pool.create_state().unwrap();
        pool.close();
        assert_eq!(3, factory.releases());
        state.add(&[Atom::persistent("a").positive()]);
        assert!(state.satisfiable().unwrap());
        state.close();
        assert_eq!(4, factory.releases());
    }

    #[test]
    fn test_drop_closes_pool() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 2).build().unwrap();
        drop(pool);
        assert_eq!(2, factory.created());
        assert_eq!(2, factory.releases());
    }

    #[test]
    fn test_blocked_taker_is_woken_by_close() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 1)
            .task_source(Box::<StalledTaskSource>::default())
            .build()
            .unwrap();
        thread::scope(|s| {
            let taker = s.spawn(|| pool.create_state().map(|_| ()));
            thread::sleep(Duration::from_millis(100));
            pool.close();
            assert_eq!(
                "the pool is closed",
                taker.join().unwrap().unwrap_err().to_string()
            );
        });
        assert_eq!(0, factory.created());
    }

    #[test]
    fn test_creation_failure_is_reported() {
        let pool = PoolBuilder::new(Arc::new(FailingFactory), 1)
            .inline()
            .build()
            .unwrap();
        let err = pool.create_state().err().unwrap();
        assert_eq!("the pool failed to create a solver state", err.to_string());
        assert_eq!("no solver available", err.root_cause().to_string());
        assert_eq!(1, pool.available());
    }

    #[test]
    fn test_decorator_is_applied() {
        let factory = Arc::new(CountingFactory::default());
        let x = Atom::persistent("x");
        let x_in_decorator = x.clone();
        let pool = PoolBuilder::new(factory, 2)
            .inline()
            .decorator(move |mut s| {
                s.add(&[x_in_decorator.positive()]);
                s
            })
            .build()
            .unwrap();
        let mut state = pool.create_state().unwrap();
        assert_eq!(1, state.n_clauses());
        assert_eq!(Some([x].into_iter().collect()), state.witness().unwrap());
    }

    #[test]
    fn test_concurrent_takers() {
        let factory = Arc::new(CountingFactory::default());
        let pool = PoolBuilder::new(factory.clone(), 2)
            .workers(2)
            .build()
            .unwrap();
        thread::scope(|s| {
            let takers = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        (0..10)
                            .map(|_| pool.create_state().map(|st| st.close()))
                            .collect::<Result<Vec<()>>>()
                    })
                })
                .collect::<Vec<_>>();
            for t in takers {
                assert!(t.join().unwrap().is_ok());
            }
        });
        drop(pool);
        assert_eq!(42, factory.created());
        assert_eq!(42, factory.releases());
    }

    #[test]
    fn test_pool_as_factory() {
        let factory = Arc::new(CountingFactory::default());
        let inner = PoolBuilder::new(factory.clone(), 1).inline().build().unwrap();
        let outer = PoolBuilder::new(Arc::new(inner), 1).inline().build().unwrap();
        assert!(outer.create_state().is_ok());
        assert_eq!(3, factory.created());
    }
}
