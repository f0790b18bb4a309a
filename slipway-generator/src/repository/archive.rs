//! Archive repository

use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use slipway_client::{ArchiveOptions, ClientError, WorkerClient};
use uuid::Uuid;

/// Repository trait for downloading a course's generated archive
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ArchiveRepository: Send + Sync {
    /// Streams the archive into `dest`
    ///
    /// # Returns
    /// Number of bytes written
    async fn download_archive(
        &self,
        course_id: Uuid,
        options: &ArchiveOptions,
        dest: &Path,
    ) -> Result<u64, ClientError>;
}

#[async_trait]
impl ArchiveRepository for WorkerClient {
    async fn download_archive(
        &self,
        course_id: Uuid,
        options: &ArchiveOptions,
        dest: &Path,
    ) -> Result<u64, ClientError> {
        WorkerClient::download_archive(self, course_id, options)
            .await?
            .save_to(dest)
            .await
    }
}
