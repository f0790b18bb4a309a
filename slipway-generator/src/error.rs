//! Error types for the generation pipeline

use std::time::Duration;

use slipway_client::ClientError;
use slipway_core::domain::job::JobStatus;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors from downloading and staging repository sources
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid repository URL: {0}")]
    InvalidUrl(String),

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to download {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive entry escapes the staging area: {0}")]
    UnsafeEntry(String),

    #[error("archive entry {found} is outside the snapshot folder {expected}")]
    MixedRoots { expected: String, found: String },

    #[error("no supported files found in {url}")]
    NoMatchingFiles { url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors from downloading and unpacking the generated archive
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("archive download failed: {0}")]
    Download(#[source] ClientError),

    #[error("malformed archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive entry escapes the output directory: {0}")]
    UnsafeEntry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors from submitting a job and waiting for it
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("job submission failed: {0}")]
    Submit(#[source] ClientError),

    /// The worker reported a terminal failure (`failed` or `timeout`)
    #[error("job failed with status {status}: {message}")]
    JobFailed {
        job_id: Uuid,
        status: JobStatus,
        message: String,
    },

    /// The local wait budget ran out before the job reached a terminal status
    #[error(
        "timeout waiting for job {job_id} completion after {elapsed:?} (last status: {})",
        status_label(.last_status)
    )]
    WaitTimeout {
        job_id: Uuid,
        elapsed: Duration,
        last_status: Option<JobStatus>,
    },

    #[error(
        "wait for job {job_id} cancelled after {elapsed:?} (last status: {})",
        status_label(.last_status)
    )]
    Cancelled {
        job_id: Uuid,
        elapsed: Duration,
        last_status: Option<JobStatus>,
    },

    #[error("job not found: {job_id}")]
    JobNotFound { job_id: Uuid },

    #[error("failed to get job status: {0}")]
    Status(#[source] ClientError),
}

fn status_label(status: &Option<JobStatus>) -> &'static str {
    status.map_or("unknown", JobStatus::as_str)
}

impl WaitError {
    /// Whether the job was known to the worker when the wait ended
    pub fn was_submitted(&self) -> bool {
        !matches!(self, Self::Submit(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Pipeline error, tagged with the stage that failed
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build worker client: {0}")]
    Client(#[source] ClientError),

    #[error("worker unavailable: {0}")]
    Health(#[source] ClientError),

    #[error("failed to prepare staging area: {0}")]
    Staging(#[source] std::io::Error),

    #[error("failed to fetch sources: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to upload sources: {0}")]
    Upload(#[source] ClientError),

    #[error("generation failed: {0}")]
    Generation(#[from] WaitError),

    #[error("failed to download results: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("generation cancelled during {stage}")]
    Cancelled { stage: &'static str },
}

impl GenerateError {
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::Generation(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_failed_message() {
        let err = WaitError::JobFailed {
            job_id: Uuid::new_v4(),
            status: JobStatus::Failed,
            message: "theme not installed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "job failed with status failed: theme not installed"
        );
    }

    #[test]
    fn test_remote_and_local_timeouts_are_worded_differently() {
        let job_id = Uuid::new_v4();
        let remote = WaitError::JobFailed {
            job_id,
            status: JobStatus::Timeout,
            message: String::new(),
        };
        let local = WaitError::WaitTimeout {
            job_id,
            elapsed: Duration::from_secs(900),
            last_status: Some(JobStatus::Processing),
        };

        assert!(remote.to_string().starts_with("job failed with status timeout"));
        let local = local.to_string();
        assert!(local.starts_with("timeout waiting for job"));
        assert!(local.contains("last status: processing"));
    }

    #[test]
    fn test_cancelled_without_status() {
        let err = WaitError::Cancelled {
            job_id: Uuid::new_v4(),
            elapsed: Duration::ZERO,
            last_status: None,
        };
        assert!(err.to_string().contains("last status: unknown"));
        assert!(GenerateError::from(err).is_cancelled());
    }
}
