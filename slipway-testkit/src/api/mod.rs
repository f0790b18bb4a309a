//! API Module
//!
//! HTTP surface of the fake worker. Each submodule handles endpoints for a
//! specific resource; `codehost` stands in for the public repository host.

pub mod codehost;
pub mod error;
pub mod health;
pub mod job;
pub mod storage;
pub mod theme;
pub mod worker;

use axum::{
    Router,
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::state::SharedState;

/// Create the router serving the worker API under `/api/v1` and the code host at the root
pub fn create_router(state: SharedState) -> Router {
    let api = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Jobs
        .route("/generate", post(job::submit_job))
        .route("/jobs", get(job::list_jobs))
        .route("/jobs/{id}", get(job::get_job))
        // Storage
        .route(
            "/storage/jobs/{id}/sources",
            post(storage::upload_sources).get(storage::list_sources),
        )
        .route("/storage/jobs/{id}/sources/{*name}", get(storage::download_source))
        .route("/storage/jobs/{id}/logs", get(storage::job_logs))
        .route("/storage/courses/{id}/results", get(storage::list_results))
        .route("/storage/courses/{id}/results/{*name}", get(storage::download_result))
        .route("/storage/courses/{id}/archive", get(storage::download_archive))
        .route("/storage/info", get(storage::storage_info))
        // Themes
        .route("/themes/available", get(theme::list_available))
        .route("/themes/install", post(theme::install))
        .route("/themes/jobs/{id}/detect", get(theme::detect))
        .route("/themes/jobs/{id}/install", post(theme::auto_install))
        // Worker pool
        .route("/worker/health", get(health::worker_health))
        .route("/worker/stats", get(worker::stats))
        .route("/worker/workspaces", get(worker::list_workspaces))
        .route("/worker/workspaces/cleanup", post(worker::cleanup_workspaces))
        .route(
            "/worker/workspaces/{id}",
            get(worker::get_workspace).delete(worker::delete_workspace),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .nest("/api/v1", api)
        .route(
            "/{owner}/{repo}/archive/refs/heads/{file}",
            get(codehost::branch_archive),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Reject requests without the configured bearer token
async fn require_token(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let expected = state.lock().required_token.clone();
    if let Some(token) = expected {
        let provided = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if provided != Some(format!("Bearer {}", token).as_str()) {
            return ApiError::Unauthorized("missing or invalid bearer token".to_string())
                .into_response();
        }
    }
    next.run(request).await
}
