//! SQLite backing for the result store.
//!
//! One connection behind a mutex. Callers lock it for a single statement and
//! never across an analysis run.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub mod analysis_repo;
pub mod error;
pub mod migrations;

pub use error::DatabaseError;

const FILE_PRAGMAS: &str = "PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the analysis database at `path`, creating its directory and
    /// applying pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(FILE_PRAGMAS)?;
        let db = Self::migrated(conn)?;

        log::info!("Analysis database ready at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(mut conn: Connection) -> Result<Self, DatabaseError> {
        migrations::run_all(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(db: &Database, table: &str) -> u32 {
        db.with_conn(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
        })
        .unwrap()
    }

    fn insert_processing(db: &Database, file_name: &str) {
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO analysis_results (file_name, query, status, created_at, updated_at)
                 VALUES (?1, 'q', 'processing', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
                [file_name],
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_in_memory_is_migrated() {
        let db = Database::open_in_memory().unwrap();
        assert!(count(&db, "_migrations") > 0);
        assert_eq!(count(&db, "analysis_results"), 0);
    }

    #[test]
    fn test_open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("var").join("findoc").join("analysis.db");

        let db = Database::open(&path).unwrap();

        assert!(path.exists());
        assert!(count(&db, "_migrations") > 0);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.db");

        {
            let db = Database::open(&path).unwrap();
            insert_processing(&db, "q1.pdf");
            insert_processing(&db, "q2.pdf");
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(count(&db, "analysis_results"), 2);
    }

    #[test]
    fn test_clones_share_one_connection() {
        let db = Database::open_in_memory().unwrap();
        let other = db.clone();

        insert_processing(&db, "shared.pdf");

        assert_eq!(count(&other, "analysis_results"), 1);
    }
}
