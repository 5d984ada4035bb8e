use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use moka::sync::Cache;
use tracing::{debug, info, warn};

use super::job::{Job, JobOutput, JobPayload, JobState};
use super::limiter::AdmissionLimiter;
use super::QueueError;

#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub capacity: usize,
    /// Job states are forgotten this long after their last update.
    pub retention: Duration,
    pub submissions_per_minute: Option<u32>,
}

impl QueueSettings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            capacity: config.queue_capacity,
            retention: Duration::from_secs(config.result_retention_secs),
            submissions_per_minute: config.submissions_per_minute,
        }
    }
}

/// In-process job broker.
///
/// Hands jobs to workers over a bounded channel and tracks each job's state
/// in a TTL cache keyed by job id. Cloning shares the same queue.
#[derive(Clone)]
pub struct JobQueue {
    inner: Arc<Inner>,
}

struct Inner {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
    states: Cache<String, JobState>,
    limiter: Option<Mutex<AdmissionLimiter>>,
    closed: AtomicBool,
}

impl JobQueue {
    pub fn new(settings: QueueSettings) -> Self {
        let (sender, receiver) = bounded(settings.capacity);
        let states = Cache::builder().time_to_live(settings.retention).build();
        let limiter = settings
            .submissions_per_minute
            .map(|limit| Mutex::new(AdmissionLimiter::per_minute(limit)));

        info!(
            capacity = settings.capacity,
            retention_secs = settings.retention.as_secs(),
            "Job queue ready"
        );

        Self {
            inner: Arc::new(Inner {
                sender,
                receiver,
                states,
                limiter,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Queues `payload` and returns its new job id without waiting for any
    /// worker. On error the payload is dropped, which removes its staged file.
    pub fn enqueue(&self, payload: JobPayload) -> Result<String, QueueError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(QueueError::Unavailable("queue is shut down".to_string()));
        }

        // Held until the send settles so a rejected job can return its slot.
        let mut limiter = match &self.inner.limiter {
            Some(limiter) => {
                let mut guard = limiter.lock().map_err(|_| {
                    QueueError::Unavailable("admission limiter poisoned".to_string())
                })?;
                if let Err(wait) = guard.try_acquire(Instant::now()) {
                    return Err(QueueError::RateLimited {
                        retry_after_secs: wait.as_secs().max(1),
                    });
                }
                Some(guard)
            }
            None => None,
        };

        let job = Job::new(payload);
        let job_id = job.id.clone();

        // Recorded before sending so a fast worker's `Running` is never overwritten.
        self.inner.states.insert(job_id.clone(), JobState::Pending);

        let reason = match self.inner.sender.try_send(job) {
            Ok(()) => {
                debug!(job_id = %job_id, depth = self.depth(), "Job enqueued");
                return Ok(job_id);
            }
            Err(TrySendError::Full(_)) => {
                warn!(job_id = %job_id, "Queue full, rejecting job");
                "queue is full"
            }
            Err(TrySendError::Disconnected(_)) => "queue is disconnected",
        };

        self.inner.states.invalidate(&job_id);
        if let Some(limiter) = limiter.as_mut() {
            limiter.refund();
        }
        Err(QueueError::Unavailable(reason.to_string()))
    }

    /// Current state of `job_id`. Unknown and expired ids read as `Pending`.
    pub fn status(&self, job_id: &str) -> JobState {
        self.inner.states.get(job_id).unwrap_or(JobState::Pending)
    }

    pub(crate) fn mark_running(&self, job_id: &str) {
        self.set_state(job_id, JobState::Running);
    }

    pub(crate) fn mark_succeeded(&self, job_id: &str, output: JobOutput) {
        self.set_state(job_id, JobState::Succeeded(output));
    }

    pub(crate) fn mark_failed(&self, job_id: &str, error: String) {
        self.set_state(job_id, JobState::Failed(error));
    }

    fn set_state(&self, job_id: &str, state: JobState) {
        if let Some(current) = self.inner.states.get(job_id) {
            if current.is_terminal() {
                warn!(
                    job_id = %job_id,
                    current = current.label(),
                    attempted = state.label(),
                    "Ignoring state change for finished job"
                );
                return;
            }
        }
        self.inner.states.insert(job_id.to_string(), state);
    }

    pub(crate) fn receiver(&self) -> Receiver<Job> {
        self.inner.receiver.clone()
    }

    /// Number of jobs waiting for a worker.
    pub fn depth(&self) -> usize {
        self.inner.sender.len()
    }

    /// Stops accepting new jobs. Already queued jobs are still delivered.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            info!(remaining = self.depth(), "Job queue closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}
