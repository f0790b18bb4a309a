//! Error types for the Slipway client

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Field-level validation failure reported by the worker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetail {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub value: String,
}

/// Structured error returned by the worker API
#[derive(Debug, Clone, Default, Error, Deserialize)]
#[error("API error {status}: {message}")]
pub struct ApiError {
    /// HTTP status code, always taken from the response line
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "validation_errors")]
    pub details: Vec<ValidationDetail>,
}

#[derive(Deserialize)]
struct SimpleErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Build an error from a non-success response body
    ///
    /// The body is tried as a full structured error, then as a plain
    /// `{"error": ..}` / `{"message": ..}` object. Anything else falls back to
    /// the HTTP status line.
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        if let Ok(mut full) = serde_json::from_slice::<ApiError>(body) {
            if !full.message.is_empty() {
                full.status = status.as_u16();
                return full;
            }
        }

        if let Ok(simple) = serde_json::from_slice::<SimpleErrorBody>(body) {
            let message = if simple.error.is_empty() {
                simple.message
            } else {
                simple.error
            };
            if !message.is_empty() {
                return Self::new(status.as_u16(), message);
            }
        }

        Self::new(status.as_u16(), status.to_string())
    }

    pub fn has_validation_errors(&self) -> bool {
        !self.details.is_empty()
    }
}

/// Errors that can occur when using the Slipway client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("job not found: {job_id}")]
    JobNotFound { job_id: Uuid },

    #[error("workspace not found: {job_id}")]
    WorkspaceNotFound { job_id: Uuid },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Local file access failed while preparing a request or saving a download
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api(ApiError::new(status, message))
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            Self::JobNotFound { .. } | Self::WorkspaceNotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }

    /// Bad request carrying field-level details
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Api(e) if e.status == 400 && e.has_validation_errors())
    }

    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Self::Api(e) if e.status == 401)
    }

    /// Server-side failures and throttling that may clear up on retry
    pub fn is_temporary(&self) -> bool {
        self.is_server_error() || self.status() == Some(429)
    }

    /// The request did not complete within the transport timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::RequestFailed(e) => e.is_timeout(),
            Self::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }

    /// Failures worth retrying: transport timeouts and lost connections, plus
    /// 408 and 504 answers
    pub fn is_transient(&self) -> bool {
        self.is_timeout()
            || matches!(self, Self::RequestFailed(e) if e.is_connect())
            || matches!(self.status(), Some(408) | Some(504))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_api_error() {
        let body = br#"{
            "message": "invalid request",
            "path": "/api/v1/generate",
            "request_id": "req-42",
            "validation_errors": [{"field": "course_id", "code": "required", "message": "missing"}]
        }"#;

        let err = ApiError::from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "invalid request");
        assert_eq!(err.request_id.as_deref(), Some("req-42"));
        assert_eq!(err.details[0].field, "course_id");
        assert_eq!(err.to_string(), "API error 400: invalid request");

        let err = ClientError::Api(err);
        assert!(err.is_validation_error());
        assert!(err.is_client_error());
        assert!(!err.is_temporary());
    }

    #[test]
    fn test_parse_simple_error_field() {
        let err = ApiError::from_body(StatusCode::CONFLICT, br#"{"error": "job already exists"}"#);
        assert_eq!(err.status, 409);
        assert_eq!(err.message, "job already exists");
    }

    #[test]
    fn test_parse_falls_back_to_status_line() {
        let err = ApiError::from_body(StatusCode::BAD_GATEWAY, b"<html>upstream down</html>");
        assert_eq!(err.message, "502 Bad Gateway");

        let err = ApiError::from_body(StatusCode::NOT_FOUND, b"{}");
        assert_eq!(err.message, "404 Not Found");
    }

    #[test]
    fn test_not_found_classification() {
        let job_id = Uuid::new_v4();
        let err = ClientError::JobNotFound { job_id };
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), format!("job not found: {}", job_id));

        assert!(ClientError::api_error(404, "gone").is_not_found());
        assert!(!ClientError::api_error(500, "boom").is_not_found());
    }

    #[test]
    fn test_temporary_and_auth_classification() {
        assert!(ClientError::api_error(503, "busy").is_temporary());
        assert!(ClientError::api_error(429, "slow down").is_temporary());
        assert!(!ClientError::api_error(400, "bad").is_temporary());
        assert!(ClientError::api_error(401, "no token").is_authentication_error());
        assert!(!ClientError::api_error(503, "busy").is_transient());
    }

    #[test]
    fn test_server_timeouts_are_transient() {
        assert!(ClientError::api_error(504, "gateway timeout").is_transient());
        assert!(ClientError::api_error(408, "request timeout").is_transient());
        assert!(!ClientError::api_error(500, "boom").is_transient());
    }

    #[test]
    fn test_io_timeout_is_transient() {
        let err = ClientError::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow disk"));
        assert!(err.is_timeout());
        assert!(err.is_transient());
        assert!(!ClientError::ParseError("bad json".into()).is_transient());
    }
}
