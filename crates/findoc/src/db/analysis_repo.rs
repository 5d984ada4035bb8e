//! Analysis result repository — row-level operations on `analysis_results`.
//!
//! Status values are plain strings at this layer; the state machine lives in
//! [`crate::store`].

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};

/// A raw analysis result row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRow {
    pub id: i64,
    pub file_name: String,
    pub query: String,
    pub analysis: Option<String>,
    pub error: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl AnalysisRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            file_name: row.get("file_name")?,
            query: row.get("query")?,
            analysis: row.get("analysis")?,
            error: row.get("error")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts a new row and returns its auto-assigned id.
pub fn insert(
    db: &Database,
    file_name: &str,
    query: &str,
    status: &str,
    now: &str,
) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO analysis_results (file_name, query, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![file_name, query, status, now],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Moves a row from `expected` to `next` status in one statement.
///
/// `analysis` and `error` are only written when `Some`. Returns `false` when no
/// row with that id is currently in `expected`.
pub fn transition(
    db: &Database,
    id: i64,
    expected: &str,
    next: &str,
    analysis: Option<&str>,
    error: Option<&str>,
    now: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE analysis_results
             SET status = ?3,
                 analysis = COALESCE(?4, analysis),
                 error = COALESCE(?5, error),
                 updated_at = ?6
             WHERE id = ?1 AND status = ?2",
            params![id, expected, next, analysis, error, now],
        )?;
        Ok(changed == 1)
    })
}

/// Finds a row by its id.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<AnalysisRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM analysis_results WHERE id = ?1",
                params![id],
                AnalysisRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Lists rows newest first, returning (rows, total_count).
pub fn list(db: &Database, limit: u64, offset: u64) -> Result<(Vec<AnalysisRow>, u64), DatabaseError> {
    db.with_conn(|conn| {
        let total: u64 =
            conn.query_row("SELECT COUNT(*) FROM analysis_results", [], |r| r.get(0))?;

        let mut stmt = conn.prepare(
            "SELECT * FROM analysis_results ORDER BY id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], AnalysisRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((rows, total))
    })
}

/// Counts rows with the given status.
pub fn count_by_status(db: &Database, status: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM analysis_results WHERE status = ?1",
            params![status],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
