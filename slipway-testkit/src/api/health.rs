//! Health Check API Handlers

use axum::{Json, extract::State, http::StatusCode};
use slipway_core::domain::health::HealthReport;
use slipway_core::domain::worker::{WorkerHealth, WorkerPool};

use crate::state::SharedState;

/// GET /health
/// Service health; 503 whenever the scripted status is not healthy
pub async fn health_check(State(state): State<SharedState>) -> (StatusCode, Json<HealthReport>) {
    let status = state.lock().health;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let report = HealthReport {
        status,
        service: "fake-worker".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Some(chrono::Utc::now()),
        checks: Default::default(),
    };
    (code, Json(report))
}

/// GET /worker/health
pub async fn worker_health(State(state): State<SharedState>) -> (StatusCode, Json<WorkerHealth>) {
    let state = state.lock();
    let code = if state.health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let active = state
        .jobs
        .values()
        .filter(|r| !r.job.status.is_terminal())
        .count() as u32;
    let health = WorkerHealth {
        status: state.health,
        worker_pool: WorkerPool {
            active_workers: active.min(1),
            worker_count: 1,
            queue_size: active.saturating_sub(1),
        },
    };
    (code, Json(health))
}
