pub mod executor;
pub mod pool;

pub use executor::execute_job;
pub use pool::WorkerPool;
