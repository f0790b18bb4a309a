//! Generator configuration
//!
//! Defines the source repository, worker connection, output location and the
//! wait contract for a single generation run.

use std::path::PathBuf;
use std::time::Duration;

use slipway_client::ClientConfig;

use crate::error::ConfigError;
use crate::service::fetcher::GITHUB_PREFIX;

/// Polling contract for waiting on a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSpec {
    /// Time between two status checks
    pub interval: Duration,
    /// Local budget for the whole wait, measured from the start of polling
    pub timeout: Duration,
}

impl WaitSpec {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Defaults used for a full generation, which allows more time than a bare wait
    pub fn generation() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(15 * 60))
    }
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(10 * 60))
    }
}

/// How staged files are sent to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    /// Load every file into memory before sending
    #[default]
    InMemory,
    /// Read each file while the request body is sent
    Streaming,
}

/// Generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Repository URL, `https://github.com/<owner>/<repo>[/tree/<branch>[/<path>]]`
    pub github_url: String,

    /// Worker connection settings
    pub client: ClientConfig,

    /// Where the archive is saved and extracted
    pub output_dir: PathBuf,

    /// Restrict sources to this folder, relative to the URL's own sub-path
    pub subfolder: Option<String>,

    pub wait: WaitSpec,

    pub upload_mode: UploadMode,

    /// Host serving branch archives
    pub archive_base: String,

    /// Entry file the worker renders
    pub source_path: String,
}

impl GeneratorConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_ARCHIVE_BASE: &'static str = "https://github.com";

    /// Creates a new configuration with defaults
    pub fn new(github_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            github_url: github_url.into(),
            client: ClientConfig::new(api_url).with_timeout(Self::DEFAULT_REQUEST_TIMEOUT),
            output_dir: PathBuf::from("./output"),
            subfolder: None,
            wait: WaitSpec::generation(),
            upload_mode: UploadMode::default(),
            archive_base: Self::DEFAULT_ARCHIVE_BASE.to_string(),
            source_path: "slides.md".to_string(),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.client = self.client.with_auth_token(token);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_subfolder(mut self, subfolder: impl Into<String>) -> Self {
        self.subfolder = Some(subfolder.into());
        self
    }

    pub fn with_wait(mut self, wait: WaitSpec) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_upload_mode(mut self, mode: UploadMode) -> Self {
        self.upload_mode = mode;
        self
    }

    pub fn with_archive_base(mut self, base: impl Into<String>) -> Self {
        self.archive_base = base.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github_url.is_empty() {
            return Err(ConfigError::new("github_url cannot be empty"));
        }

        if !self.github_url.starts_with(GITHUB_PREFIX) {
            return Err(ConfigError::new(format!(
                "github_url must start with {}",
                GITHUB_PREFIX
            )));
        }

        if !is_http_url(&self.client.base_url) {
            return Err(ConfigError::new("api_url must start with http:// or https://"));
        }

        if !is_http_url(&self.archive_base) {
            return Err(ConfigError::new("archive_base must start with http:// or https://"));
        }

        if self.wait.interval.is_zero() {
            return Err(ConfigError::new("wait interval must be greater than 0"));
        }

        if self.wait.timeout.is_zero() {
            return Err(ConfigError::new("wait timeout must be greater than 0"));
        }

        if self.source_path.is_empty() {
            return Err(ConfigError::new("source_path cannot be empty"));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig::new("https://github.com/acme/deck", "http://localhost:8081")
    }

    #[test]
    fn test_default_config() {
        let config = config();
        assert_eq!(config.wait.interval, Duration::from_secs(5));
        assert_eq!(config.wait.timeout, Duration::from_secs(900));
        assert_eq!(config.client.timeout, Duration::from_secs(60));
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.upload_mode, UploadMode::InMemory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bare_wait_defaults() {
        let wait = WaitSpec::default();
        assert_eq!(wait.interval, Duration::from_secs(5));
        assert_eq!(wait.timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();

        config.github_url = "https://gitlab.com/acme/deck".to_string();
        assert!(config.validate().is_err());
        config.github_url = "https://github.com/acme/deck".to_string();

        config.client.base_url = "localhost:8081".to_string();
        assert!(config.validate().is_err());
        config.client.base_url = "https://worker.example.com".to_string();
        assert!(config.validate().is_ok());

        config.wait.interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_shorter_than_interval_is_allowed() {
        let config = config().with_wait(WaitSpec::new(
            Duration::from_secs(10),
            Duration::from_secs(1),
        ));
        assert!(config.validate().is_ok());
    }
}
