//! Job-related API endpoints

use reqwest::StatusCode;
use slipway_core::domain::job::{GenerationRequest, Job};
use slipway_core::dto::job::{JobList, ListJobsQuery};
use tracing::debug;
use uuid::Uuid;

use crate::WorkerClient;
use crate::error::{ClientError, Result};

impl WorkerClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a generation job
    ///
    /// # Arguments
    /// * `request` - Identifiers, source entry file and metadata for the job
    ///
    /// # Returns
    /// The created job, normally `pending`
    pub async fn submit_job(&self, request: &GenerationRequest) -> Result<Job> {
        debug!(job_id = %request.job_id, course_id = %request.course_id, "Submitting generation job");
        let response = self
            .client
            .post(self.url("/generate"))
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a job by ID
    ///
    /// # Arguments
    /// * `job_id` - The job UUID
    ///
    /// # Returns
    /// The current job snapshot, or [`ClientError::JobNotFound`] on 404
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{}", job_id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::JobNotFound { job_id });
        }

        self.handle_response(response).await
    }

    /// List jobs, optionally filtered by status or course
    ///
    /// # Arguments
    /// * `query` - Filters and pagination
    pub async fn list_jobs(&self, query: &ListJobsQuery) -> Result<JobList> {
        let response = self
            .client
            .get(self.url("/jobs"))
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
