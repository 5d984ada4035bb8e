//! Process wiring: store, staging, queue, analysis pipeline and worker pool.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::analysis::{AnalysisPipeline, Analyzer, Roles};
use crate::api::{build_router, AppState};
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::queue::{JobQueue, QueueSettings};
use crate::staging::StagingArea;
use crate::store::ResultStore;
use crate::worker::WorkerPool;

/// A running findoc instance without its HTTP listener.
///
/// Built from [`Config`] with the production pipeline. The pipeline's blocking
/// HTTP clients mean `start` and `shutdown` must run outside an async runtime
/// when an LLM or search key is configured.
pub struct Service {
    pub queue: JobQueue,
    pub store: ResultStore,
    pub staging: StagingArea,
    config: Config,
    pool: WorkerPool,
}

impl Service {
    pub fn start(config: &Config) -> Result<Self> {
        let pipeline = AnalysisPipeline::from_config(config, Arc::new(Roles::default()))?;
        Self::with_analyzer(config, Arc::new(pipeline))
    }

    pub fn with_analyzer(config: &Config, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        let store = ResultStore::new(Database::open(&config.database_path())?);
        let staging = StagingArea::new(config.staging_directory())?;
        let queue = JobQueue::new(QueueSettings::from_config(config));
        let pool = WorkerPool::start(config.worker_count, queue.clone(), store.clone(), analyzer)?;

        info!(workers = config.worker_count, "findoc service started");

        Ok(Self {
            queue,
            store,
            staging,
            config: config.clone(),
            pool,
        })
    }

    pub fn router(&self) -> Router {
        let state = AppState::new(
            &self.config,
            self.queue.clone(),
            self.store.clone(),
            self.staging.clone(),
        );
        build_router(Arc::new(state))
    }

    /// Refuses new jobs, lets queued and running jobs finish, then joins the
    /// workers.
    pub fn shutdown(self) {
        self.queue.close();
        self.pool.drain();
        self.pool.wait();
        info!("findoc service stopped");
    }
}
