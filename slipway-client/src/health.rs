//! Service health endpoint

use slipway_core::domain::health::HealthReport;

use crate::WorkerClient;
use crate::error::Result;

impl WorkerClient {
    /// Check the service health
    ///
    /// A 503 response is not an error: its body reports a degraded or
    /// unhealthy status instead.
    pub async fn health(&self) -> Result<HealthReport> {
        let response = self.client.get(self.url("/health")).send().await?;

        self.handle_status_response(response).await
    }
}
