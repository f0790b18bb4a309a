//! Jobs repository
//!
//! Liveness, job submission, status polling and log retrieval.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use slipway_client::{ClientError, WorkerClient};
use slipway_core::domain::health::HealthReport;
use slipway_core::domain::job::{GenerationRequest, Job};
use uuid::Uuid;

/// Repository trait for job-related operations with the worker
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Checks the worker; degraded and unhealthy reports are not errors
    async fn health(&self) -> Result<HealthReport, ClientError>;

    /// Submits a generation request
    ///
    /// # Arguments
    /// * `request` - The request to submit
    async fn submit_job(&self, request: &GenerationRequest) -> Result<Job, ClientError>;

    /// Fetches the current job snapshot
    ///
    /// Returns [`ClientError::JobNotFound`] when the worker does not know the job.
    async fn get_job(&self, job_id: Uuid) -> Result<Job, ClientError>;

    /// Fetches the worker's processing log for a job
    async fn job_logs(&self, job_id: Uuid) -> Result<String, ClientError>;
}

#[async_trait]
impl JobRepository for WorkerClient {
    async fn health(&self) -> Result<HealthReport, ClientError> {
        WorkerClient::health(self).await
    }

    async fn submit_job(&self, request: &GenerationRequest) -> Result<Job, ClientError> {
        WorkerClient::submit_job(self, request).await
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Job, ClientError> {
        WorkerClient::get_job(self, job_id).await
    }

    async fn job_logs(&self, job_id: Uuid) -> Result<String, ClientError> {
        WorkerClient::job_logs(self, job_id).await
    }
}
