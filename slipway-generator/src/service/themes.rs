//! Theme resolution
//!
//! Advisory stage: the worker may still render with fallback themes, so
//! failures here are logged and never abort the pipeline.

use std::sync::Arc;

use slipway_core::domain::theme::ThemeAutoInstall;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::repository::ThemeRepository;

pub struct ThemeResolver {
    themes: Arc<dyn ThemeRepository>,
}

impl ThemeResolver {
    pub fn new(themes: Arc<dyn ThemeRepository>) -> Self {
        Self { themes }
    }

    /// Ask the worker to detect and install the job's themes
    ///
    /// # Returns
    /// The report, or `None` when the request itself failed
    pub async fn resolve(&self, job_id: Uuid) -> Option<ThemeAutoInstall> {
        let report = match self.themes.auto_install_themes(job_id).await {
            Ok(report) => report,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Theme installation failed, continuing");
                return None;
            }
        };

        let (successful, failed) = report.tally();
        info!(job_id = %job_id, successful, failed, "Themes resolved");

        for result in &report.results {
            if result.success {
                debug!(theme = %result.theme, "Theme installed");
            } else {
                warn!(
                    theme = %result.theme,
                    error = result.error.as_deref().unwrap_or("unknown error"),
                    "Theme could not be installed"
                );
            }
        }

        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockThemeRepository;
    use slipway_client::ClientError;
    use slipway_core::domain::theme::ThemeInstallResult;

    #[tokio::test]
    async fn test_transport_failure_is_advisory() {
        let mut themes = MockThemeRepository::new();
        themes
            .expect_auto_install_themes()
            .times(1)
            .returning(|_| Err(ClientError::api_error(500, "npm registry unreachable")));

        let resolver = ThemeResolver::new(Arc::new(themes));
        assert!(resolver.resolve(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_partial_failure_returns_report() {
        let mut themes = MockThemeRepository::new();
        themes.expect_auto_install_themes().returning(|_| {
            Ok(ThemeAutoInstall {
                results: vec![
                    ThemeInstallResult {
                        theme: "seriph".to_string(),
                        success: true,
                        installed: true,
                        error: None,
                    },
                    ThemeInstallResult {
                        theme: "bricks".to_string(),
                        success: false,
                        installed: false,
                        error: Some("not found".to_string()),
                    },
                ],
                successful: 1,
                failed: 1,
            })
        });

        let resolver = ThemeResolver::new(Arc::new(themes));
        let report = resolver.resolve(Uuid::new_v4()).await.unwrap();
        assert_eq!(report.tally(), (1, 1));
    }
}
