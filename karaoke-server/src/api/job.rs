//! Job API Handlers
//!
//! HTTP endpoints for submitting karaoke jobs, polling them and fetching the
//! finished video.

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use karaoke_core::{CreateJob, JobSnapshot};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /api/jobs
/// Create a job and queue it for processing
pub async fn create_job(
    State(manager): State<AppState>,
    Json(req): Json<CreateJob>,
) -> ApiResult<Json<JobSnapshot>> {
    let url = req.url.unwrap_or_default();
    tracing::info!("Creating job for url: {:?}", url);

    // provisioning the job directory touches the filesystem
    let job = tokio::task::spawn_blocking(move || manager.create_job(&url))
        .await
        .map_err(|e| ApiError::InternalError(format!("Job creation task failed: {}", e)))??;
    Ok(Json(job))
}

/// GET /api/jobs
/// List all jobs, oldest first
pub async fn list_jobs(State(manager): State<AppState>) -> Json<Vec<JobSnapshot>> {
    tracing::debug!("Listing all jobs");
    Json(manager.list_jobs())
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(manager): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobSnapshot>> {
    tracing::debug!("Getting job: {}", id);

    let job = manager.get_job(parse_job_id(&id)?)?;
    Ok(Json(job))
}

/// GET /api/jobs/{id}/download
/// Stream the final karaoke video of a completed job
pub async fn download_output(
    State(manager): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_job_id(&id)?;
    let path = manager.job_output(id)?;
    tracing::info!("Serving output of job {}: {}", id, path.display());

    let file = tokio::fs::File::open(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ApiError::NotFound("Output file missing".to_string()),
        _ => ApiError::InternalError(format!("Failed to open {}: {}", path.display(), e)),
    })?;

    let headers = [
        (header::CONTENT_TYPE, "video/mp4".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"karaoke-{}.mp4\"", id),
        ),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// Unparsable IDs cannot name a job, so they are reported as not found
fn parse_job_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Job not found".to_string()))
}
