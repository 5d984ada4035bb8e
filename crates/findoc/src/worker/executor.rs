//! The per-job execution contract.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{error, info, info_span, warn};

use crate::analysis::Analyzer;
use crate::queue::{Job, JobOutput, JobQueue};
use crate::sanitize;
use crate::staging::StagedFile;
use crate::store::{RecordStatus, ResultStore};

/// Runs one job to a terminal state.
///
/// Creates the record, runs the analyzer, records the outcome in the store,
/// removes the staged file and only then publishes the outcome to the queue,
/// so a poller that sees a terminal state never finds the upload on disk.
/// Never panics and never returns an error: every failure is folded into the
/// job's `Failed` state.
pub fn execute_job(job: Job, analyzer: &dyn Analyzer, store: &ResultStore, queue: &JobQueue) {
    let Job { id, payload } = job;
    let mut file = payload.file;
    let _span = info_span!(
        "job",
        job_id = %id,
        file = %sanitize::redact_path(file.path())
    )
    .entered();

    queue.mark_running(&id);

    let outcome = match store.create(&payload.file_name, &payload.query) {
        Ok(record_id) => run_analysis(record_id, &payload.query, &file, analyzer, store),
        Err(e) => {
            error!(error = %e, "Failed to create analysis record");
            Err(format!("Failed to create analysis record: {}", e))
        }
    };

    file.release();

    match outcome {
        Ok(output) => queue.mark_succeeded(&id, output),
        Err(message) => queue.mark_failed(&id, message),
    }
}

fn run_analysis(
    record_id: i64,
    query: &str,
    file: &StagedFile,
    analyzer: &dyn Analyzer,
    store: &ResultStore,
) -> Result<JobOutput, String> {
    let outcome = catch_unwind(AssertUnwindSafe(|| analyzer.analyze(query, file.path())));

    let message = match outcome {
        Ok(Ok(analysis)) => {
            match store.update_status(record_id, RecordStatus::Completed, Some(&analysis)) {
                Ok(()) => {
                    info!(record_id, "Analysis completed");
                    return Ok(JobOutput {
                        record_id,
                        analysis,
                    });
                }
                Err(e) => {
                    error!(record_id, error = %e, "Failed to store completed analysis");
                    format!("Failed to store analysis: {}", e)
                }
            }
        }
        Ok(Err(e)) => {
            let message = e.to_string();
            warn!(record_id, stage = ?e.stage(), error = %message, "Analysis failed");
            message
        }
        Err(panic) => {
            let message = format!("Analysis panicked: {}", panic_message(&*panic));
            error!(record_id, "{}", message);
            message
        }
    };

    record_failure(store, record_id, &message);
    Err(message)
}

fn record_failure(store: &ResultStore, record_id: i64, message: &str) {
    if let Err(e) = store.update_status(record_id, RecordStatus::Failed, Some(message)) {
        error!(record_id, error = %e, "Failed to mark record as failed");
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
