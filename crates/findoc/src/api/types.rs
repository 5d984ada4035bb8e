use serde::{Deserialize, Serialize};

use crate::queue::JobState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Query string of `GET /analyses`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub status: &'static str,
    pub task_id: String,
    pub file_processed: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub queue_depth: usize,
    pub workers: usize,
    pub accepting_jobs: bool,
}

/// Body of `GET /result/{task_id}`.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultResponse {
    Pending {
        status: &'static str,
    },
    Completed {
        status: &'static str,
        result: String,
        record_id: i64,
    },
    Failed {
        status: &'static str,
        error: String,
    },
    /// Any other queue state, passed through with a null result.
    Other {
        status: &'static str,
        result: Option<String>,
    },
}

impl From<JobState> for ResultResponse {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Pending => ResultResponse::Pending { status: "pending" },
            JobState::Succeeded(output) => ResultResponse::Completed {
                status: "completed",
                result: output.analysis,
                record_id: output.record_id,
            },
            JobState::Failed(error) => ResultResponse::Failed {
                status: "failed",
                error,
            },
            other => ResultResponse::Other {
                status: other.label(),
                result: None,
            },
        }
    }
}
