// crates/server/src/routes/logs.rs
//! Collection job endpoints: list, create, fetch, delete.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use logpack_core::{archive_file_name, Job, JobState};

use crate::collector;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A job record as served to clients.
///
/// Identical to [`Job`] plus the download URL, which is recomputed per
/// request from the caller's Host header so it never goes stale when the
/// serving host or port changes.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct LogJobResponse {
    pub id: String,
    pub file_name: String,
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub download_url: String,
}

impl LogJobResponse {
    fn from_job(job: Job, base: &str) -> Self {
        Self {
            download_url: download_url(base, &job.file_name),
            id: job.id,
            file_name: job.file_name,
            state: job.state,
            error: job.error,
        }
    }
}

/// Where a job's archive can be fetched, as seen from `base`.
///
/// Pure function of (base URL, artifact name); never stored on the record.
pub fn download_url(base: &str, file_name: &str) -> String {
    format!("{base}/static/logs/{}", archive_file_name(file_name))
}

/// Reconstruct the base URL the caller used to reach us.
///
/// Without a Host header the base degrades to empty, leaving a root-relative
/// download path that still resolves against the same server.
fn base_url(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_default()
}

fn validated(id: String) -> ApiResult<String> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("missing log id".to_string()));
    }
    Ok(id)
}

/// GET /v1/logs - List all collection jobs.
async fn list_logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Vec<LogJobResponse>> {
    tracing::debug!("request to list log jobs");
    let base = base_url(&headers);
    let jobs = state
        .registry
        .snapshot()
        .into_iter()
        .map(|job| LogJobResponse::from_job(job, &base))
        .collect();
    Json(jobs)
}

/// POST /v1/logs - Create a job and trigger collection.
///
/// The job is registered and returned immediately, always in `in_progress`:
/// the response is built from the record as created, before the spawned
/// collection task can make any state update observable.
async fn create_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<LogJobResponse> {
    let job = Job::new();
    tracing::info!(job_id = %job.id, file = %job.file_name, "starting log collection");

    state.registry.insert(job.clone());
    collector::spawn_collection(state, &job);

    Json(LogJobResponse::from_job(job, &base_url(&headers)))
}

/// GET /v1/logs/{id} - Fetch a single job.
async fn get_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<LogJobResponse>> {
    let id = validated(id)?;
    tracing::debug!(job_id = %id, "load log job");
    let job = state.registry.get(&id).ok_or(ApiError::JobNotFound(id))?;
    Ok(Json(LogJobResponse::from_job(job, &base_url(&headers))))
}

/// DELETE /v1/logs/{id} - Remove a job and schedule artifact deletion.
///
/// The registry entry is gone as soon as this returns; removing the backing
/// file happens asynchronously and best-effort. An in-flight collector for
/// the job is not cancelled.
async fn delete_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = validated(id)?;
    tracing::debug!(job_id = %id, "delete log job");
    let job = state
        .registry
        .remove(&id)
        .ok_or(ApiError::JobNotFound(id))?;

    collector::spawn_artifact_removal(&state, &job.file_name);
    Ok(StatusCode::NO_CONTENT)
}

/// Build the logs router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/logs", get(list_logs).post(create_log))
        .route("/logs/{id}", get(get_log).delete(delete_log))
}
