//! Worker pool and workspace endpoints

use reqwest::StatusCode;
use slipway_core::domain::worker::{
    WorkerHealth, WorkerStats, WorkspaceCleanup, WorkspaceCleanupBatch, WorkspaceDetails,
    WorkspacePage,
};
use slipway_core::dto::worker::{CleanupQuery, ListWorkspacesQuery};
use uuid::Uuid;

use crate::WorkerClient;
use crate::error::{ClientError, Result};

impl WorkerClient {
    // =============================================================================
    // Worker Pool
    // =============================================================================

    /// Check the worker pool; 503 still returns the body
    pub async fn worker_health(&self) -> Result<WorkerHealth> {
        let response = self.client.get(self.url("/worker/health")).send().await?;

        self.handle_status_response(response).await
    }

    pub async fn worker_stats(&self) -> Result<WorkerStats> {
        let response = self.client.get(self.url("/worker/stats")).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Workspaces
    // =============================================================================

    /// List job workspaces on the worker
    ///
    /// # Arguments
    /// * `query` - Status filter and pagination
    pub async fn list_workspaces(&self, query: &ListWorkspacesQuery) -> Result<WorkspacePage> {
        let response = self
            .client
            .get(self.url("/worker/workspaces"))
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a job's workspace
    ///
    /// # Returns
    /// Workspace details, or [`ClientError::WorkspaceNotFound`] on 404
    pub async fn get_workspace(&self, job_id: Uuid) -> Result<WorkspaceDetails> {
        let response = self
            .client
            .get(self.url(&format!("/worker/workspaces/{}", job_id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::WorkspaceNotFound { job_id });
        }

        self.handle_response(response).await
    }

    /// Delete a job's workspace
    pub async fn delete_workspace(&self, job_id: Uuid) -> Result<WorkspaceCleanup> {
        let response = self
            .client
            .delete(self.url(&format!("/worker/workspaces/{}", job_id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::WorkspaceNotFound { job_id });
        }

        self.handle_response(response).await
    }

    /// Remove workspaces older than `max_age_hours` (worker default when `None`)
    pub async fn cleanup_workspaces(&self, max_age_hours: Option<u32>) -> Result<WorkspaceCleanupBatch> {
        let response = self
            .client
            .post(self.url("/worker/workspaces/cleanup"))
            .query(&CleanupQuery { max_age_hours })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
