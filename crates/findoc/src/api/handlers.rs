use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, info_span, Instrument};

use crate::queue::JobPayload;
use crate::sanitize;

use super::error::ApiError;
use super::types::{HealthResponse, ListParams, MessageResponse, QueuedResponse, ResultResponse};
use super::AppState;

const FALLBACK_FILE_NAME: &str = "document.pdf";
const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// GET / - liveness.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Financial Document Analyzer API is running",
    })
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let accepting_jobs = !state.queue.is_closed();
    Json(HealthResponse {
        status: if accepting_jobs { "ok" } else { "draining" },
        version: env!("CARGO_PKG_VERSION"),
        queue_depth: state.queue.depth(),
        workers: state.worker_count,
        accepting_jobs,
    })
}

struct Upload {
    file_name: String,
    content: axum::body::Bytes,
}

/// POST /analyze - stage the upload and queue it for analysis.
///
/// Multipart fields: `file` (required) and `query` (optional; blank means the
/// configured default query).
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload: Option<Upload> = None;
    let mut query: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .and_then(sanitize::display_name)
                    .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
                let content = field.bytes().await?;
                upload = Some(Upload { file_name, content });
            }
            Some("query") => {
                query = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let Upload { file_name, content } =
        upload.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    let query = resolve_query(query.as_deref(), &state.default_query);

    let span = info_span!("analyze", file = %file_name, bytes = content.len());
    async move {
        let staging = state.staging.clone();
        let original_name = file_name.clone();
        let staged = tokio::task::spawn_blocking(move || staging.stage(&content, &original_name))
            .await
            .map_err(|e| ApiError::Upload(e.to_string()))??;

        // A rejected payload is dropped here, which removes the staged file.
        let task_id = state
            .queue
            .enqueue(JobPayload::new(staged, query, file_name.clone()))?;

        info!(task_id = %task_id, "Analysis queued");

        Ok::<_, ApiError>((
            StatusCode::ACCEPTED,
            Json(QueuedResponse {
                status: "queued",
                task_id,
                file_processed: file_name,
            }),
        ))
    }
    .instrument(span)
    .await
}

/// GET /result/{task_id}
pub async fn result(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Json<ResultResponse> {
    Json(ResultResponse::from(state.queue.status(&task_id)))
}

/// GET /analyses/{record_id}
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(record_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let record = tokio::task::spawn_blocking(move || store.get(record_id))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(record))
}

/// GET /analyses?limit&offset - stored records, newest first.
pub async fn list_analyses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0);
    let store = state.store.clone();
    let page = tokio::task::spawn_blocking(move || store.list(limit, offset))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(page))
}

/// Trims the submitted query; blank or absent falls back to `default`.
pub fn resolve_query(submitted: Option<&str>, default: &str) -> String {
    match submitted.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => default.to_string(),
    }
}
