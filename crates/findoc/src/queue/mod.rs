pub mod broker;
pub mod job;
pub mod limiter;

use thiserror::Error;

pub use broker::{JobQueue, QueueSettings};
pub use job::{Job, JobOutput, JobPayload, JobState};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Queue unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}
