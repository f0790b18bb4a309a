//! API Error Handling
//!
//! Error responses in the shapes the real worker produces.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::state::Injected;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    /// Scripted failure with an arbitrary status
    Injected(StatusCode, String),
}

impl From<&Injected> for ApiError {
    fn from(injected: &Injected) -> Self {
        let status =
            StatusCode::from_u16(injected.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError::Injected(status, injected.message.clone())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            // Structured body, as the worker's auth middleware returns
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "message": msg,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })),
            )
                .into_response(),
            ApiError::Injected(status, msg) => {
                tracing::warn!("Injected error {}: {}", status, msg);
                (status, Json(serde_json::json!({ "error": msg }))).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
