//! Startup and shutdown of a whole findoc instance.

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use findoc::{Config, FindocError, JobPayload, JobState, RecordStatus, Service, WorkerError};

use common::EchoAnalyzer;

fn config(dir: &TempDir) -> Config {
    Config {
        data_directory: dir.path().to_path_buf(),
        worker_count: 2,
        ..Default::default()
    }
}

#[test]
fn test_start_from_config_creates_layout() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let service = Service::start(&config).unwrap();

    assert!(config.database_path().exists());
    assert!(config.staging_directory().is_dir());
    assert!(!service.queue.is_closed());
    service.shutdown();
}

#[test]
fn test_zero_workers_is_a_worker_error() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        worker_count: 0,
        ..config(&dir)
    };

    let result = Service::with_analyzer(&config, Arc::new(EchoAnalyzer));

    assert!(matches!(
        result,
        Err(FindocError::Worker(WorkerError::NoWorkers))
    ));
}

#[test]
fn test_unwritable_database_location_is_a_database_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"file").unwrap();
    let config = Config {
        database_path: Some(blocker.join("analysis.db")),
        ..config(&dir)
    };

    let result = Service::with_analyzer(&config, Arc::new(EchoAnalyzer));

    assert!(matches!(result, Err(FindocError::Database(_))));
}

#[test]
fn test_shutdown_finishes_queued_jobs() {
    let dir = TempDir::new().unwrap();
    let service = Service::with_analyzer(&config(&dir), Arc::new(EchoAnalyzer)).unwrap();

    let ids: Vec<String> = (0..4)
        .map(|i| {
            let file = service
                .staging
                .stage(format!("doc {}", i).as_bytes(), "report.txt")
                .unwrap();
            service
                .queue
                .enqueue(JobPayload::new(file, "q", "report.txt"))
                .unwrap()
        })
        .collect();

    let queue = service.queue.clone();
    let store = service.store.clone();
    service.shutdown();

    for id in &ids {
        assert!(matches!(queue.status(id), JobState::Succeeded(_)));
    }
    assert_eq!(store.count_by_status(RecordStatus::Completed).unwrap(), 4);
    assert!(queue.is_closed());
}
