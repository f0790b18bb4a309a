//! Worker Pool and Workspace API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use slipway_core::domain::worker::{
    WorkerPool, WorkerStats, WorkspaceCleanup, WorkspaceCleanupBatch, WorkspaceDetails,
    WorkspacePage, WorkspaceUsage,
};
use slipway_core::dto::worker::{CleanupQuery, ListWorkspacesQuery};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::state::SharedState;

const DEFAULT_PAGE_SIZE: u32 = 20;

/// GET /worker/stats
pub async fn stats(State(state): State<SharedState>) -> Json<WorkerStats> {
    let state = state.lock();
    let mut extra = std::collections::HashMap::new();
    extra.insert("jobs_submitted".to_string(), serde_json::json!(state.submitted.len()));

    Json(WorkerStats {
        worker_pool: WorkerPool {
            active_workers: 0,
            worker_count: 1,
            queue_size: 0,
        },
        extra,
    })
}

/// GET /worker/workspaces
pub async fn list_workspaces(
    State(state): State<SharedState>,
    Query(query): Query<ListWorkspacesQuery>,
) -> Json<WorkspacePage> {
    let state = state.lock();
    let mut workspaces: Vec<_> = state
        .workspaces
        .values()
        .filter(|w| query.status.as_ref().is_none_or(|s| &w.status == s))
        .cloned()
        .collect();
    workspaces.sort_by_key(|w| w.job_id);

    let total_count = workspaces.len();
    let page_size = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let offset = query.offset.unwrap_or(0);
    let workspaces = workspaces
        .into_iter()
        .skip(offset as usize)
        .take(page_size as usize)
        .collect();

    Json(WorkspacePage {
        workspaces,
        total_count,
        page: offset / page_size + 1,
        page_size,
    })
}

/// GET /worker/workspaces/{id}
pub async fn get_workspace(
    State(state): State<SharedState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<WorkspaceDetails>> {
    let state = state.lock();
    let workspace = state
        .workspaces
        .get(&job_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Workspace {} not found", job_id)))?;

    Ok(Json(WorkspaceDetails {
        usage: WorkspaceUsage {
            disk_bytes: workspace.size_bytes,
            file_count: workspace.file_count,
        },
        workspace,
        activity: Default::default(),
    }))
}

/// DELETE /worker/workspaces/{id}
pub async fn delete_workspace(
    State(state): State<SharedState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<WorkspaceCleanup>> {
    let removed = state
        .lock()
        .workspaces
        .remove(&job_id)
        .ok_or_else(|| ApiError::NotFound(format!("Workspace {} not found", job_id)))?;

    Ok(Json(WorkspaceCleanup {
        job_id,
        cleaned: true,
        size_freed: removed.size_bytes,
    }))
}

/// POST /worker/workspaces/cleanup
/// Remove every workspace whose last activity is older than the threshold
pub async fn cleanup_workspaces(
    State(state): State<SharedState>,
    Query(query): Query<CleanupQuery>,
) -> Json<WorkspaceCleanupBatch> {
    let max_age = chrono::Duration::hours(i64::from(query.max_age_hours.unwrap_or(24)));
    let cutoff = chrono::Utc::now() - max_age;

    let mut state = state.lock();
    let stale: Vec<Uuid> = state
        .workspaces
        .values()
        .filter(|w| w.last_activity.is_none_or(|at| at < cutoff))
        .map(|w| w.job_id)
        .collect();

    let workspaces: Vec<WorkspaceCleanup> = stale
        .iter()
        .filter_map(|id| state.workspaces.remove(id))
        .map(|w| WorkspaceCleanup {
            job_id: w.job_id,
            cleaned: true,
            size_freed: w.size_bytes,
        })
        .collect();

    Json(WorkspaceCleanupBatch {
        cleaned_count: workspaces.len(),
        total_size_freed: workspaces.iter().map(|w| w.size_freed).sum(),
        workspaces,
    })
}
