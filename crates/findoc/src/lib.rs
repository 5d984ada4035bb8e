pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod queue;
pub mod sanitize;
pub mod service;
pub mod staging;
pub mod store;
pub mod worker;

pub use analysis::{AnalysisError, AnalysisPipeline, Analyzer, Roles};
pub use api::{build_router, AppState};
pub use config::{apply_env, load_config, Config, DEFAULT_QUERY};
pub use db::Database;
pub use error::{ConfigError, FindocError, Result, StagingError, WorkerError};
pub use queue::{JobPayload, JobQueue, JobState, QueueError, QueueSettings};
pub use service::Service;
pub use staging::{StagedFile, StagingArea};
pub use store::{AnalysisRecord, RecordStatus, ResultStore, StoreError};
pub use worker::WorkerPool;
