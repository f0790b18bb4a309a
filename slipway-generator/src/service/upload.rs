//! Upload stage
//!
//! Sends staged files to the worker as one multipart batch.

use std::sync::Arc;

use slipway_client::{ClientError, FileUpload, StreamUpload};
use slipway_core::domain::storage::UploadReceipt;
use tracing::info;
use uuid::Uuid;

use crate::config::UploadMode;
use crate::repository::SourceRepository;
use crate::service::fetcher::FetchedFile;

pub struct SourceUploader {
    sources: Arc<dyn SourceRepository>,
    mode: UploadMode,
}

impl SourceUploader {
    pub fn new(sources: Arc<dyn SourceRepository>, mode: UploadMode) -> Self {
        Self { sources, mode }
    }

    /// Upload every staged file for `job_id`
    ///
    /// # Returns
    /// The worker's receipt; its `count` is the number of accepted files
    pub async fn upload(&self, job_id: Uuid, files: &[FetchedFile]) -> Result<UploadReceipt, ClientError> {
        info!(job_id = %job_id, count = files.len(), mode = ?self.mode, "Uploading sources");

        let receipt = match self.mode {
            UploadMode::InMemory => {
                let mut uploads = Vec::with_capacity(files.len());
                for file in files {
                    uploads.push(FileUpload {
                        name: file.relative_path.clone(),
                        content: tokio::fs::read(&file.local_path).await?,
                        content_type: Some(file.content_type.clone()),
                    });
                }
                self.sources.upload_sources(job_id, uploads).await?
            }
            UploadMode::Streaming => {
                let mut uploads = Vec::with_capacity(files.len());
                for file in files {
                    let reader = tokio::fs::File::open(&file.local_path).await?;
                    uploads.push(StreamUpload {
                        name: file.relative_path.clone(),
                        size: reader.metadata().await?.len(),
                        reader: Box::new(reader),
                        content_type: Some(file.content_type.clone()),
                    });
                }
                self.sources.upload_sources_stream(job_id, uploads).await?
            }
        };

        info!(job_id = %job_id, count = receipt.count, "Sources uploaded");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockSourceRepository;
    use std::path::Path;

    fn stage(dir: &Path, name: &str, content: &str) -> FetchedFile {
        let local_path = dir.join(name);
        std::fs::write(&local_path, content).unwrap();
        FetchedFile {
            relative_path: name.to_string(),
            local_path,
            content_type: "text/markdown".to_string(),
            size: content.len() as u64,
        }
    }

    fn receipt(count: usize) -> UploadReceipt {
        UploadReceipt {
            count,
            files: Vec::new(),
            message: String::new(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_upload_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![stage(dir.path(), "slides.md", "# Deck")];

        let mut sources = MockSourceRepository::new();
        sources
            .expect_upload_sources()
            .withf(|_, uploads| {
                uploads.len() == 1
                    && uploads[0].name == "slides.md"
                    && uploads[0].content == b"# Deck"
                    && uploads[0].content_type.as_deref() == Some("text/markdown")
            })
            .times(1)
            .returning(|_, uploads| Ok(receipt(uploads.len())));
        sources.expect_upload_sources_stream().never();

        let uploader = SourceUploader::new(Arc::new(sources), UploadMode::InMemory);
        let result = uploader.upload(Uuid::new_v4(), &files).await.unwrap();
        assert_eq!(result.count, 1);
    }

    #[tokio::test]
    async fn test_streaming_upload_announces_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            stage(dir.path(), "slides.md", "# Deck"),
            stage(dir.path(), "notes.md", "speaker notes"),
        ];

        let mut sources = MockSourceRepository::new();
        sources.expect_upload_sources().never();
        sources
            .expect_upload_sources_stream()
            .withf(|_, uploads| {
                uploads.iter().map(|u| u.size).collect::<Vec<_>>() == vec![6, 13]
            })
            .times(1)
            .returning(|_, uploads| Ok(receipt(uploads.len())));

        let uploader = SourceUploader::new(Arc::new(sources), UploadMode::Streaming);
        let result = uploader.upload(Uuid::new_v4(), &files).await.unwrap();
        assert_eq!(result.count, 2);
    }

    #[tokio::test]
    async fn test_empty_upload_still_sends_batch() {
        let mut sources = MockSourceRepository::new();
        sources
            .expect_upload_sources()
            .withf(|_, uploads| uploads.is_empty())
            .times(1)
            .returning(|_, _| Ok(receipt(0)));

        let uploader = SourceUploader::new(Arc::new(sources), UploadMode::InMemory);
        let result = uploader.upload(Uuid::new_v4(), &[]).await.unwrap();
        assert_eq!(result.count, 0);
    }

    #[tokio::test]
    async fn test_rejected_upload_surfaces_api_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![stage(dir.path(), "slides.md", "# Deck")];

        let mut sources = MockSourceRepository::new();
        sources
            .expect_upload_sources()
            .returning(|_, _| Err(ClientError::api_error(413, "payload too large")));

        let uploader = SourceUploader::new(Arc::new(sources), UploadMode::InMemory);
        let err = uploader.upload(Uuid::new_v4(), &files).await.unwrap_err();
        assert_eq!(err.status(), Some(413));
    }
}
