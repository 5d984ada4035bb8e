//! HTTP ingress.
//!
//! Handlers only stage uploads, enqueue jobs and read state; analysis never
//! runs on the async runtime.

pub mod error;
pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::queue::JobQueue;
use crate::staging::StagingArea;
use crate::store::ResultStore;

pub use error::ApiError;
pub use types::ResultResponse;

/// State shared by every handler.
pub struct AppState {
    pub queue: JobQueue,
    pub store: ResultStore,
    pub staging: StagingArea,
    pub default_query: String,
    pub max_upload_bytes: usize,
    pub worker_count: usize,
}

impl AppState {
    pub fn new(config: &Config, queue: JobQueue, store: ResultStore, staging: StagingArea) -> Self {
        Self {
            queue,
            store,
            staging,
            default_query: config.default_query.clone(),
            max_upload_bytes: config.max_upload_bytes,
            worker_count: config.worker_count,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/analyze",
            post(handlers::analyze).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/result/{task_id}", get(handlers::result))
        .route("/analyses", get(handlers::list_analyses))
        .route("/analyses/{record_id}", get(handlers::get_analysis))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
