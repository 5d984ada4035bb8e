use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, error, info};

use crate::analysis::Analyzer;
use crate::error::WorkerError;
use crate::queue::{Job, JobQueue};
use crate::store::ResultStore;

use super::executor::execute_job;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed set of OS threads pulling jobs from a [`JobQueue`].
///
/// Each worker runs one job at a time for its full duration.
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    draining: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn start(
        worker_count: usize,
        queue: JobQueue,
        store: ResultStore,
        analyzer: Arc<dyn Analyzer>,
    ) -> Result<Self, WorkerError> {
        if worker_count == 0 {
            return Err(WorkerError::NoWorkers);
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let draining = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let ctx = WorkerContext {
                worker_id,
                jobs: queue.receiver(),
                queue: queue.clone(),
                store: store.clone(),
                analyzer: Arc::clone(&analyzer),
                shutdown: Arc::clone(&shutdown),
                draining: Arc::clone(&draining),
            };

            let handle = thread::Builder::new()
                .name(format!("findoc-worker-{}", worker_id))
                .spawn(move || run_worker(ctx))
                .map_err(|e| {
                    shutdown.store(true, Ordering::Relaxed);
                    WorkerError::SpawnFailed(e.to_string())
                })?;

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Ok(Self {
            workers,
            shutdown,
            draining,
        })
    }

    /// Workers stop after their current job; queued jobs are left behind.
    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Workers stop once the queue is empty.
    pub fn drain(&self) {
        info!("Draining worker pool...");
        self.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Joins every worker. Call after [`shutdown`](Self::shutdown) or
    /// [`drain`](Self::drain), otherwise this blocks indefinitely.
    pub fn wait(self) {
        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }
}

struct WorkerContext {
    worker_id: usize,
    jobs: Receiver<Job>,
    queue: JobQueue,
    store: ResultStore,
    analyzer: Arc<dyn Analyzer>,
    shutdown: Arc<AtomicBool>,
    draining: Arc<AtomicBool>,
}

fn run_worker(ctx: WorkerContext) {
    debug!("Worker {} started", ctx.worker_id);

    loop {
        if ctx.shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", ctx.worker_id);
            break;
        }

        match ctx.jobs.recv_timeout(POLL_INTERVAL) {
            Ok(job) => {
                debug!("Worker {} processing job {}", ctx.worker_id, job.id);
                execute_job(job, ctx.analyzer.as_ref(), &ctx.store, &ctx.queue);
            }
            Err(RecvTimeoutError::Timeout) => {
                if ctx.draining.load(Ordering::Relaxed) {
                    debug!("Worker {} drained", ctx.worker_id);
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", ctx.worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", ctx.worker_id);
}
