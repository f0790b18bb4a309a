//! Sources repository

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use slipway_client::{ClientError, FileUpload, StreamUpload, WorkerClient};
use slipway_core::domain::storage::UploadReceipt;
use uuid::Uuid;

/// Repository trait for uploading job sources
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Uploads files already held in memory as one multipart batch
    async fn upload_sources(&self, job_id: Uuid, files: Vec<FileUpload>) -> Result<UploadReceipt, ClientError>;

    /// Uploads files read lazily while the batch is sent
    async fn upload_sources_stream(
        &self,
        job_id: Uuid,
        uploads: Vec<StreamUpload>,
    ) -> Result<UploadReceipt, ClientError>;
}

#[async_trait]
impl SourceRepository for WorkerClient {
    async fn upload_sources(&self, job_id: Uuid, files: Vec<FileUpload>) -> Result<UploadReceipt, ClientError> {
        WorkerClient::upload_sources(self, job_id, files).await
    }

    async fn upload_sources_stream(
        &self,
        job_id: Uuid,
        uploads: Vec<StreamUpload>,
    ) -> Result<UploadReceipt, ClientError> {
        WorkerClient::upload_sources_stream(self, job_id, uploads).await
    }
}
