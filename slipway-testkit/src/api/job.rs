//! Job API Handlers
//!
//! Submission and scripted status polling.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use slipway_core::domain::job::{GenerationRequest, Job};
use slipway_core::dto::job::{JobList, ListJobsQuery};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::state::{PollStep, SharedState};

// =============================================================================
// Job Lifecycle Endpoints
// =============================================================================

/// POST /generate
/// Accept a generation request as a new pending job
pub async fn submit_job(
    State(state): State<SharedState>,
    Json(request): Json<GenerationRequest>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    tracing::info!("Accepting job {} for course {}", request.job_id, request.course_id);

    let mut state = state.lock();
    if let Some(injected) = &state.submit_error {
        return Err(injected.into());
    }
    if request.source_path.is_empty() {
        return Err(ApiError::BadRequest("source_path is required".to_string()));
    }

    let job = state.accept(request);
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /jobs/{id}
/// Answer with the next scripted step for the job
pub async fn get_job(State(state): State<SharedState>, Path(id): Path<Uuid>) -> ApiResult<Json<Job>> {
    tracing::debug!("Polling job: {}", id);

    let mut state = state.lock();
    let record = state
        .jobs
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Job {} not found", id)))?;

    match record.next_step() {
        Some(PollStep::Status(status)) => {
            record.job.status = status;
        }
        Some(PollStep::Fail { status, message }) => {
            record.job.status = status;
            record.job.error = Some(message);
        }
        Some(PollStep::NotFound) => {
            return Err(ApiError::NotFound(format!("Job {} not found", id)));
        }
        Some(PollStep::Error(code)) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return Err(ApiError::Injected(status, "scripted failure".to_string()));
        }
        None => {}
    }

    record.job.updated_at = chrono::Utc::now();
    Ok(Json(record.job.clone()))
}

/// GET /jobs
/// List jobs matching the optional filters
pub async fn list_jobs(
    State(state): State<SharedState>,
    Query(query): Query<ListJobsQuery>,
) -> Json<JobList> {
    let state = state.lock();
    let mut jobs: Vec<Job> = state
        .jobs
        .values()
        .map(|r| r.job.clone())
        .filter(|j| query.status.is_none_or(|s| j.status == s))
        .filter(|j| query.course_id.is_none_or(|c| j.course_id == c))
        .collect();
    jobs.sort_by_key(|j| j.created_at);

    let total_count = jobs.len();
    let offset = query.offset.unwrap_or(0) as usize;
    let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
    let jobs = jobs.into_iter().skip(offset).take(limit).collect();

    Json(JobList { jobs, total_count })
}
