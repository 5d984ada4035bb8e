//! Durable analysis records and their status state machine.
//!
//! A record is created in `processing` when a worker picks up a job and moves
//! exactly once to `completed` (with its analysis) or `failed`. Each call
//! locks the connection for one statement; nothing is held across analysis.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::analysis_repo::{self, AnalysisRow};
use crate::db::{Database, DatabaseError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Analysis record {0} not found")]
    NotFound(i64),

    #[error("Invalid status transition for record {id}: {from} -> {to}")]
    InvalidTransition {
        id: i64,
        from: RecordStatus,
        to: RecordStatus,
    },

    #[error("Record {0} cannot be completed without an analysis")]
    MissingAnalysis(i64),

    #[error("Unknown record status '{0}'")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Processing => "processing",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordStatus::Completed | RecordStatus::Failed)
    }

    /// Only `processing -> completed` and `processing -> failed` are allowed.
    pub fn can_transition_to(&self, next: RecordStatus) -> bool {
        matches!(
            (self, next),
            (RecordStatus::Processing, RecordStatus::Completed)
                | (RecordStatus::Processing, RecordStatus::Failed)
        )
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RecordStatus::Pending),
            "processing" => Ok(RecordStatus::Processing),
            "completed" => Ok(RecordStatus::Completed),
            "failed" => Ok(RecordStatus::Failed),
            other => Err(StoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// One submission's durable lifecycle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub file_name: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRow> for AnalysisRecord {
    type Error = StoreError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            status: row.status.parse()?,
            created_at: parse_timestamp(&row.created_at, row.id),
            updated_at: parse_timestamp(&row.updated_at, row.id),
            file_name: row.file_name,
            query: row.query,
            analysis: row.analysis,
            error: row.error,
        })
    }
}

fn parse_timestamp(s: &str, id: i64) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::warn!("Record {} has unparseable timestamp '{}': {}", id, s, e);
            Utc::now()
        })
}

/// A page of records, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    pub records: Vec<AnalysisRecord>,
    pub total: u64,
}

#[derive(Clone)]
pub struct ResultStore {
    db: Database,
}

impl ResultStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts a record in `processing` and returns its id.
    pub fn create(&self, file_name: &str, query: &str) -> Result<i64, StoreError> {
        let now = Utc::now().to_rfc3339();
        let id = analysis_repo::insert(
            &self.db,
            file_name,
            query,
            RecordStatus::Processing.as_str(),
            &now,
        )?;
        log::debug!("Created analysis record {} for {}", id, file_name);
        Ok(id)
    }

    /// Moves a record to `status`.
    ///
    /// `completed` requires `analysis`; `failed` accepts an optional error text
    /// in the same slot. Any other move fails with `InvalidTransition`.
    pub fn update_status(
        &self,
        id: i64,
        status: RecordStatus,
        analysis: Option<&str>,
    ) -> Result<(), StoreError> {
        if status == RecordStatus::Completed && analysis.is_none() {
            return Err(StoreError::MissingAnalysis(id));
        }

        let current = self.get(id)?.status;
        if !current.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                id,
                from: current,
                to: status,
            });
        }

        let (analysis, error) = match status {
            RecordStatus::Completed => (analysis, None),
            _ => (None, analysis),
        };

        let now = Utc::now().to_rfc3339();
        let changed = analysis_repo::transition(
            &self.db,
            id,
            current.as_str(),
            status.as_str(),
            analysis,
            error,
            &now,
        )?;

        if !changed {
            // Someone else moved the record between the read and the write.
            let latest = self.get(id)?.status;
            return Err(StoreError::InvalidTransition {
                id,
                from: latest,
                to: status,
            });
        }

        log::debug!("Record {} moved {} -> {}", id, current, status);
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<AnalysisRecord, StoreError> {
        analysis_repo::find_by_id(&self.db, id)?
            .ok_or(StoreError::NotFound(id))?
            .try_into()
    }

    pub fn list(&self, limit: u64, offset: u64) -> Result<RecordPage, StoreError> {
        let (rows, total) = analysis_repo::list(&self.db, limit, offset)?;
        let records = rows
            .into_iter()
            .map(AnalysisRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RecordPage { records, total })
    }

    pub fn count_by_status(&self, status: RecordStatus) -> Result<u64, StoreError> {
        Ok(analysis_repo::count_by_status(&self.db, status.as_str())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> ResultStore {
        ResultStore::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_create_starts_processing() {
        let store = test_store();
        let id = store.create("report.pdf", "summarize risks").unwrap();

        let record = store.get(id).unwrap();
        assert_eq!(record.status, RecordStatus::Processing);
        assert_eq!(record.file_name, "report.pdf");
        assert_eq!(record.query, "summarize risks");
        assert!(record.analysis.is_none());
    }

    #[test]
    fn test_complete_writes_analysis() {
        let store = test_store();
        let id = store.create("a.pdf", "q").unwrap();

        store
            .update_status(id, RecordStatus::Completed, Some("{\"ok\":true}"))
            .unwrap();

        let record = store.get(id).unwrap();
        assert_eq!(record.status, RecordStatus::Completed);
        assert_eq!(record.analysis.as_deref(), Some("{\"ok\":true}"));
        assert!(record.error.is_none());
    }

    #[test]
    fn test_complete_without_analysis_rejected() {
        let store = test_store();
        let id = store.create("a.pdf", "q").unwrap();

        let result = store.update_status(id, RecordStatus::Completed, None);
        assert!(matches!(result, Err(StoreError::MissingAnalysis(_))));
        assert_eq!(store.get(id).unwrap().status, RecordStatus::Processing);
    }

    #[test]
    fn test_fail_records_error_not_analysis() {
        let store = test_store();
        let id = store.create("a.pdf", "q").unwrap();

        store
            .update_status(id, RecordStatus::Failed, Some("unreadable document"))
            .unwrap();

        let record = store.get(id).unwrap();
        assert_eq!(record.status, RecordStatus::Failed);
        assert!(record.analysis.is_none());
        assert_eq!(record.error.as_deref(), Some("unreadable document"));
    }

    #[test]
    fn test_terminal_records_do_not_move() {
        let store = test_store();
        let id = store.create("a.pdf", "q").unwrap();
        store
            .update_status(id, RecordStatus::Completed, Some("done"))
            .unwrap();

        let result = store.update_status(id, RecordStatus::Failed, Some("late"));
        assert!(matches!(
            result,
            Err(StoreError::InvalidTransition {
                from: RecordStatus::Completed,
                to: RecordStatus::Failed,
                ..
            })
        ));

        let result = store.update_status(id, RecordStatus::Processing, None);
        assert!(matches!(result, Err(StoreError::InvalidTransition { .. })));
        assert_eq!(store.get(id).unwrap().analysis.as_deref(), Some("done"));
    }

    #[test]
    fn test_unknown_record() {
        let store = test_store();
        assert!(matches!(store.get(99), Err(StoreError::NotFound(99))));
        assert!(matches!(
            store.update_status(99, RecordStatus::Failed, None),
            Err(StoreError::NotFound(99))
        ));
    }

    #[test]
    fn test_list_and_counts() {
        let store = test_store();
        let a = store.create("a.pdf", "q").unwrap();
        let b = store.create("b.pdf", "q").unwrap();
        store.create("c.pdf", "q").unwrap();
        store.update_status(a, RecordStatus::Completed, Some("x")).unwrap();
        store.update_status(b, RecordStatus::Failed, None).unwrap();

        let page = store.list(2, 0).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].file_name, "c.pdf");

        assert_eq!(store.count_by_status(RecordStatus::Completed).unwrap(), 1);
        assert_eq!(store.count_by_status(RecordStatus::Failed).unwrap(), 1);
        assert_eq!(store.count_by_status(RecordStatus::Processing).unwrap(), 1);
    }

    #[test]
    fn test_status_transitions_table() {
        use RecordStatus::*;
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Processing));
        assert!(!Processing.can_transition_to(Pending));
        assert!(Completed.is_terminal() && Failed.is_terminal());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("failed".parse::<RecordStatus>().unwrap(), RecordStatus::Failed);
        assert!(matches!(
            "archived".parse::<RecordStatus>(),
            Err(StoreError::UnknownStatus(_))
        ));
    }
}
