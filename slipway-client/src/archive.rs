//! Course archive download

use serde::Serialize;
use uuid::Uuid;

use crate::WorkerClient;
use crate::error::Result;
use crate::storage::Download;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    Tar,
}

/// Query options for an archive download
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ArchiveFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
}

impl ArchiveOptions {
    /// Compressed zip, the format the result materializer extracts
    pub fn zip() -> Self {
        Self {
            format: Some(ArchiveFormat::Zip),
            compress: Some(true),
        }
    }
}

impl WorkerClient {
    /// Download the generated archive for a course
    ///
    /// # Arguments
    /// * `course_id` - The course UUID
    /// * `options` - Format and compression; unset fields are left to the worker
    ///
    /// # Returns
    /// A streaming download of the archive body
    pub async fn download_archive(&self, course_id: Uuid, options: &ArchiveOptions) -> Result<Download> {
        let response = self
            .client
            .get(self.url(&format!("/storage/courses/{}/archive", course_id)))
            .query(options)
            .send()
            .await?;

        self.handle_raw_response(response).await.map(Download::new)
    }
}
