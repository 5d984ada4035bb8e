//! Test harness for isolated end-to-end runs.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use axum::Router;
use tempfile::TempDir;

use findoc::analysis::Analyzer;
use findoc::{
    Config, JobPayload, JobQueue, JobState, QueueError, ResultStore, Service, StagingArea,
};

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestHarness {
    temp_dir: TempDir,
    pub config: Config,
    pub staging: StagingArea,
    pub store: ResultStore,
    pub queue: JobQueue,
    service: Option<Service>,
}

impl TestHarness {
    /// Two workers, no admission limit.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self::with_config(analyzer, |_| {})
    }

    pub fn with_config(analyzer: Arc<dyn Analyzer>, customize: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let mut config = Config {
            data_directory: temp_dir.path().to_path_buf(),
            worker_count: 2,
            queue_capacity: 64,
            ..Default::default()
        };
        customize(&mut config);

        let service =
            Service::with_analyzer(&config, analyzer).expect("Failed to start findoc service");

        Self {
            temp_dir,
            config,
            staging: service.staging.clone(),
            store: service.store.clone(),
            queue: service.queue.clone(),
            service: Some(service),
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Stages `content` and enqueues it, like `POST /analyze` does.
    pub fn submit(&self, content: &[u8], file_name: &str, query: &str) -> Result<String, QueueError> {
        let file = self
            .staging
            .stage(content, file_name)
            .expect("Failed to stage upload");
        self.queue.enqueue(JobPayload::new(file, query, file_name))
    }

    pub fn wait_for_terminal(&self, task_id: &str) -> JobState {
        self.wait_for(task_id, JobState::is_terminal)
    }

    pub fn wait_for(&self, task_id: &str, done: impl Fn(&JobState) -> bool) -> JobState {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        loop {
            let state = self.queue.status(task_id);
            if done(&state) {
                return state;
            }
            if Instant::now() > deadline {
                panic!("task {} stuck in {:?}", task_id, state);
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(self.staging.directory())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn router(&self) -> Router {
        self.service
            .as_ref()
            .expect("service already stopped")
            .router()
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        if let Some(service) = self.service.take() {
            service.shutdown();
        }
    }
}
