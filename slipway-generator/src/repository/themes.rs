//! Themes repository

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use slipway_client::{ClientError, WorkerClient};
use slipway_core::domain::theme::ThemeAutoInstall;
use uuid::Uuid;

/// Repository trait for resolving a job's theme dependencies
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ThemeRepository: Send + Sync {
    /// Detects and installs every theme the job's sources reference
    async fn auto_install_themes(&self, job_id: Uuid) -> Result<ThemeAutoInstall, ClientError>;
}

#[async_trait]
impl ThemeRepository for WorkerClient {
    async fn auto_install_themes(&self, job_id: Uuid) -> Result<ThemeAutoInstall, ClientError> {
        WorkerClient::auto_install_themes(self, job_id).await
    }
}
