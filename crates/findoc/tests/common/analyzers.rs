//! Scripted [`Analyzer`] implementations.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use findoc::analysis::{AnalysisError, Analyzer};

/// Returns `"<query>: <file text>"`.
pub struct EchoAnalyzer;

impl Analyzer for EchoAnalyzer {
    fn analyze(&self, query: &str, file_path: &Path) -> Result<String, AnalysisError> {
        let bytes = std::fs::read(file_path).map_err(|e| AnalysisError::UnreadableDocument {
            file: file_path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(format!("{}: {}", query, String::from_utf8_lossy(&bytes)))
    }
}

/// Rejects every document as unreadable.
pub struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    fn analyze(&self, _query: &str, file_path: &Path) -> Result<String, AnalysisError> {
        Err(AnalysisError::UnreadableDocument {
            file: file_path.display().to_string(),
            reason: "failed to load PDF".to_string(),
        })
    }
}

/// Records the query of every run.
#[derive(Default)]
pub struct RecordingAnalyzer {
    pub queries: Mutex<Vec<String>>,
}

impl RecordingAnalyzer {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Analyzer for RecordingAnalyzer {
    fn analyze(&self, query: &str, _file_path: &Path) -> Result<String, AnalysisError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok("recorded".to_string())
    }
}

/// Blocks every run until [`open`](Self::open) is called.
#[derive(Default)]
pub struct GateAnalyzer {
    open: Arc<AtomicBool>,
}

impl GateAnalyzer {
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }
}

impl Analyzer for GateAnalyzer {
    fn analyze(&self, _query: &str, file_path: &Path) -> Result<String, AnalysisError> {
        while !self.open.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(5));
        }
        Ok(format!("released {}", file_path.exists()))
    }
}
