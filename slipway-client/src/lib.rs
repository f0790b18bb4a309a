//! Slipway HTTP Client
//!
//! A typed async client for the presentation generation worker API.
//!
//! The client is shared by the generator pipeline and the CLI. It is cheap to
//! clone and safe to use from concurrent tasks.
//!
//! # Example
//!
//! ```no_run
//! use slipway_client::{ClientConfig, WorkerClient};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WorkerClient::from_config(&ClientConfig::new("http://localhost:8081"))?;
//!
//!     let job = client.get_job(Uuid::new_v4()).await?;
//!     println!("Job {} is {}", job.id, job.status);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod error;
mod health;
mod jobs;
pub mod storage;
mod themes;
mod worker;

// Re-export commonly used types
pub use archive::{ArchiveFormat, ArchiveOptions};
pub use error::{ApiError, ClientError, Result, ValidationDetail};
pub use storage::{Download, FileUpload, StreamUpload, detect_content_type};

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Prefix shared by every worker endpoint
const API_PREFIX: &str = "/api/v1";

/// Connection settings for a [`WorkerClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the worker (e.g., "http://localhost:8081")
    pub base_url: String,
    /// Bearer token sent with every request
    pub auth_token: Option<String>,
    /// Per-request timeout, including body transfer
    pub timeout: Duration,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the generation worker API
///
/// Endpoints are grouped by resource:
/// - Health checks
/// - Job submission and status
/// - Source and result storage
/// - Theme detection and installation
/// - Worker pool and workspace management
/// - Course archive download
#[derive(Debug, Clone)]
pub struct WorkerClient {
    /// Base URL of the worker, without trailing slash
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl WorkerClient {
    /// Create a new worker client with default transport settings
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the worker (e.g., "http://localhost:8081")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new worker client with a custom HTTP client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the worker
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build a client from connection settings
    ///
    /// The bearer token, if any, is installed as a default header and marked
    /// sensitive so it never shows up in debug output.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.auth_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ClientError::InvalidRequest(format!("invalid auth token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(&config.base_url, client))
    }

    /// Get the base URL of the worker
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Turn a non-success response into a structured API error
    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.bytes().await.unwrap_or_default();

        let mut error = ApiError::from_body(status, &body);
        if error.path.is_none() {
            error.path = Some(path);
        }
        ClientError::Api(error)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Self::decode_json(response).await
    }

    /// Handle a status response where 503 still carries a valid body
    async fn handle_status_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() && status != StatusCode::SERVICE_UNAVAILABLE {
            return Err(Self::api_error(response).await);
        }

        Self::decode_json(response).await
    }

    /// Read the whole body, then decode it
    ///
    /// Transfer failures, including a timeout mid-body, stay `RequestFailed`
    /// so callers can still classify and retry them.
    async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is returned as-is
    async fn handle_raw_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response)
    }
}
