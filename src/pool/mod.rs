//! A pool of solver states prepared in the background.

#[allow(clippy::module_inception)]
mod pool;
pub use pool::Pool;
pub use pool::PoolBuilder;

mod task_source;
pub use task_source::InlineTaskSource;
pub use task_source::Task;
pub use task_source::TaskSource;
pub use task_source::WorkerThreads;
