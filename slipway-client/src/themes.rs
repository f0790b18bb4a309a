//! Theme API endpoints

use slipway_core::domain::theme::{ThemeAutoInstall, ThemeDetection, ThemeInstallResult, ThemeList};
use slipway_core::dto::theme::InstallTheme;
use uuid::Uuid;

use crate::WorkerClient;
use crate::error::Result;

impl WorkerClient {
    // =============================================================================
    // Catalog
    // =============================================================================

    /// List themes the worker knows about
    pub async fn list_available_themes(&self) -> Result<ThemeList> {
        let response = self.client.get(self.url("/themes/available")).send().await?;

        self.handle_response(response).await
    }

    /// Install a theme by name
    ///
    /// # Arguments
    /// * `theme` - Theme name, e.g. "seriph"
    pub async fn install_theme(&self, theme: &str) -> Result<ThemeInstallResult> {
        let response = self
            .client
            .post(self.url("/themes/install"))
            .json(&InstallTheme {
                theme: theme.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Per-job Resolution
    // =============================================================================

    /// Detect the themes referenced by a job's uploaded sources
    pub async fn detect_themes(&self, job_id: Uuid) -> Result<ThemeDetection> {
        let response = self
            .client
            .get(self.url(&format!("/themes/jobs/{}/detect", job_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Detect and install every theme a job needs
    ///
    /// # Returns
    /// One result per theme; individual failures do not fail the request
    pub async fn auto_install_themes(&self, job_id: Uuid) -> Result<ThemeAutoInstall> {
        let response = self
            .client
            .post(self.url(&format!("/themes/jobs/{}/install", job_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
