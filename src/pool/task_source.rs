use anyhow::{bail, Context, Result};
use crossbeam::channel::{unbounded, Sender};
use log::{debug, warn};
use std::thread::JoinHandle;

/// A unit of work given to a [`TaskSource`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something able to run tasks, possibly in the background.
pub trait TaskSource: Send + Sync {
    /// Runs the task, now or later.
    fn execute(&self, task: Task);
}

/// A task source running the tasks in the calling thread, before returning.
#[derive(Default)]
pub struct InlineTaskSource;

impl TaskSource for InlineTaskSource {
    fn execute(&self, task: Task) {
        task()
    }
}

/// A task source backed by a set of dedicated threads sharing a queue of tasks.
///
/// When dropped, the queue is closed and the threads finish the remaining tasks before being joined.
pub struct WorkerThreads {
    sender: Option<Sender<Task>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerThreads {
    /// Starts the given number of worker threads.
    pub fn new(n_workers: usize) -> Result<Self> {
        if n_workers == 0 {
            bail!("the number of workers must be strictly positive")
        }
        let (sender, receiver) = unbounded::<Task>();
        let handles = (0..n_workers)
            .map(|i| {
                let receiver = receiver.clone();
                std::thread::Builder::new()
                    .name(format!("crustadf-worker-{}", i))
                    .spawn(move || {
                        while let Ok(task) = receiver.recv() {
                            task()
                        }
                    })
                    .context("while spawning a worker thread")
            })
            .collect::<Result<Vec<JoinHandle<()>>>>()?;
        debug!("started {} worker thread(s)", n_workers);
        Ok(Self {
            sender: Some(sender),
            handles,
        })
    }
}

impl TaskSource for WorkerThreads {
    fn execute(&self, task: Task) {
        if let Some(s) = &self.sender {
            if s.send(task).is_err() {
                warn!("a task was submitted to stopped worker threads")
            }
        }
    }
}

impl Drop for WorkerThreads {
    fn drop(&mut self) {
        self.sender.take();
        for h in self.handles.drain(..) {
            if h.join().is_err() {
                warn!("a worker thread panicked")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn test_inline() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        InlineTaskSource.execute(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(1, counter.load(Ordering::SeqCst));
    }

    #[test]
    fn test_workers_run_all_tasks_before_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let workers = WorkerThreads::new(3).unwrap();
        for _ in 0..100 {
            let c = Arc::clone(&counter);
            workers.execute(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }));
        }
        drop(workers);
        assert_eq!(100, counter.load(Ordering::SeqCst));
    }

    #[test]
    fn test_no_workers() {
        assert_eq!(
            "the number of workers must be strictly positive",
            WorkerThreads::new(0).err().unwrap().to_string()
        );
    }
}
