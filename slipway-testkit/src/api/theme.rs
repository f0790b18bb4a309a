//! Theme API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use slipway_core::domain::theme::{ThemeAutoInstall, ThemeDetection, ThemeInstallResult, ThemeList};
use slipway_core::dto::theme::InstallTheme;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// GET /themes/available
pub async fn list_available(State(state): State<SharedState>) -> Json<ThemeList> {
    let themes = state.lock().themes.clone();
    Json(ThemeList {
        count: themes.len(),
        themes,
    })
}

/// POST /themes/install
/// Mark a known theme as installed
pub async fn install(
    State(state): State<SharedState>,
    Json(request): Json<InstallTheme>,
) -> ApiResult<Json<ThemeInstallResult>> {
    let mut state = state.lock();
    let theme = state
        .themes
        .iter_mut()
        .find(|t| t.name == request.theme)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown theme {}", request.theme)))?;
    theme.installed = true;

    Ok(Json(ThemeInstallResult {
        theme: request.theme,
        success: true,
        installed: true,
        error: None,
    }))
}

/// GET /themes/jobs/{id}/detect
pub async fn detect(State(state): State<SharedState>, Path(job_id): Path<Uuid>) -> Json<ThemeDetection> {
    tracing::debug!("Detecting themes for job {}", job_id);
    Json(state.lock().detection.clone())
}

/// POST /themes/jobs/{id}/install
pub async fn auto_install(
    State(state): State<SharedState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<ThemeAutoInstall>> {
    tracing::debug!("Installing themes for job {}", job_id);

    let mut state = state.lock();
    state.theme_calls += 1;
    if let Some(injected) = &state.theme_error {
        return Err(injected.into());
    }
    Ok(Json(state.theme_report.clone()))
}
