use serde::Serialize;

use crate::staging::StagedFile;

/// What a submitter hands to the queue.
#[derive(Debug)]
pub struct JobPayload {
    /// Ownership of the staged upload moves with the payload.
    pub file: StagedFile,
    pub query: String,
    /// Client-facing name, informational only.
    pub file_name: String,
}

impl JobPayload {
    pub fn new(file: StagedFile, query: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            file,
            query: query.into(),
            file_name: file_name.into(),
        }
    }
}

/// A queued unit of work. Dropping a `Job` deletes its staged file.
#[derive(Debug)]
pub struct Job {
    pub id: String,
    pub payload: JobPayload,
}

impl Job {
    pub(crate) fn new(payload: JobPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
        }
    }
}

/// Payload reported for a successful job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobOutput {
    pub record_id: i64,
    pub analysis: String,
}

/// Externally observable job state.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Queued, or unknown to the queue.
    Pending,
    Running,
    Succeeded(JobOutput),
    Failed(String),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded(_) | JobState::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded(_) => "succeeded",
            JobState::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = Job::new(JobPayload::new(
            StagedFile::adopt(dir.path().join("a")),
            "q",
            "a.pdf",
        ));
        let b = Job::new(JobPayload::new(
            StagedFile::adopt(dir.path().join("b")),
            "q",
            "b.pdf",
        ));
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Failed("x".into()).is_terminal());
        assert!(JobState::Succeeded(JobOutput {
            record_id: 1,
            analysis: "a".into()
        })
        .is_terminal());
    }

    #[test]
    fn test_dropping_job_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("financial_document_x.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let job = Job::new(JobPayload::new(StagedFile::adopt(path.clone()), "q", "x.pdf"));
        drop(job);
        assert!(!path.exists());
    }
}
