//! Source and result storage endpoints

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::Body;
use reqwest::header::CONTENT_TYPE;
use slipway_core::domain::storage::{FileList, StorageInfo, UploadReceipt};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use crate::WorkerClient;
use crate::error::{ClientError, Result};

/// Multipart field carrying each uploaded file
const FILES_FIELD: &str = "files";

/// A file whose bytes are already in memory
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Relative path sent as the part's filename
    pub name: String,
    pub content: Vec<u8>,
    /// Detected from `name` when `None`
    pub content_type: Option<String>,
}

/// A file read lazily while the request body is sent
pub struct StreamUpload {
    pub name: String,
    pub reader: Box<dyn AsyncRead + Send + Sync + Unpin>,
    /// Exact body length, announced in the part headers
    pub size: u64,
    pub content_type: Option<String>,
}

impl fmt::Debug for StreamUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamUpload")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Map a file name to the MIME type the worker expects
pub fn detect_content_type(path: impl AsRef<Path>) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("md") => "text/markdown",
        Some("css") => "text/css",
        Some("scss") => "text/scss",
        Some("js") => "application/javascript",
        Some("ts") => "application/typescript",
        Some("vue") => "text/x-vue",
        Some("json") => "application/json",
        Some("yaml" | "yml") => "application/yaml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Name and type a part the same way for both upload modes
fn named_part(part: Part, name: &str, content_type: Option<&str>) -> Result<Part> {
    let mime = content_type.unwrap_or_else(|| detect_content_type(name));
    Ok(part.file_name(name.to_string()).mime_str(mime)?)
}

/// Part filenames carry relative paths, so they are sent without percent-encoding
fn sources_form() -> Form {
    Form::new().percent_encode_noop()
}

/// Multipart body with no parts: only the closing delimiter
fn empty_multipart_body(boundary: &str) -> String {
    format!("--{}--\r\n", boundary)
}

/// A streaming response body
///
/// Returned by the download endpoints so large archives never have to be held
/// in memory.
#[derive(Debug)]
pub struct Download {
    response: reqwest::Response,
}

impl Download {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// Body length announced by the server
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    pub async fn bytes(self) -> Result<Vec<u8>> {
        Ok(self.response.bytes().await?.to_vec())
    }

    pub async fn text(self) -> Result<String> {
        Ok(self.response.text().await?)
    }

    /// Stream the body to `path`, creating or truncating it
    ///
    /// # Returns
    /// Number of bytes written
    pub async fn save_to(mut self, path: &Path) -> Result<u64> {
        let mut file = File::create(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = self.response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

impl WorkerClient {
    // =============================================================================
    // Source Upload
    // =============================================================================

    /// Upload in-memory source files for a job
    ///
    /// # Arguments
    /// * `job_id` - The job the sources belong to
    /// * `files` - One multipart part per file; may be empty
    ///
    /// # Returns
    /// The worker's receipt with the accepted-file count
    pub async fn upload_sources(&self, job_id: Uuid, files: Vec<FileUpload>) -> Result<UploadReceipt> {
        let count = files.len();
        let mut form = sources_form();
        for file in files {
            let part = named_part(Part::bytes(file.content), &file.name, file.content_type.as_deref())?;
            form = form.part(FILES_FIELD, part);
        }

        self.send_sources(job_id, form, count).await
    }

    /// Upload source files that are read while the request is sent
    ///
    /// Produces the same parts as [`WorkerClient::upload_sources`].
    pub async fn upload_sources_stream(
        &self,
        job_id: Uuid,
        uploads: Vec<StreamUpload>,
    ) -> Result<UploadReceipt> {
        let count = uploads.len();
        let mut form = sources_form();
        for upload in uploads {
            let body = Body::wrap_stream(ReaderStream::new(upload.reader));
            let part = named_part(
                Part::stream_with_length(body, upload.size),
                &upload.name,
                upload.content_type.as_deref(),
            )?;
            form = form.part(FILES_FIELD, part);
        }

        self.send_sources(job_id, form, count).await
    }

    /// Upload files straight from disk, naming each part after its file name
    pub async fn upload_source_files(&self, job_id: Uuid, paths: &[PathBuf]) -> Result<UploadReceipt> {
        let mut uploads = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ClientError::InvalidRequest(format!("invalid file name: {}", path.display())))?
                .to_string();
            let file = File::open(path).await?;
            let size = file.metadata().await?.len();

            uploads.push(StreamUpload {
                name,
                reader: Box::new(file),
                size,
                content_type: None,
            });
        }

        self.upload_sources_stream(job_id, uploads).await
    }

    async fn send_sources(&self, job_id: Uuid, form: Form, count: usize) -> Result<UploadReceipt> {
        debug!(job_id = %job_id, count, "Uploading sources");
        let request = self
            .client
            .post(self.url(&format!("/storage/jobs/{}/sources", job_id)));

        // A form without parts serializes to an empty body, which is not a
        // valid multipart document; send the closing delimiter on its own.
        let request = if count == 0 {
            request
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", form.boundary()),
                )
                .body(empty_multipart_body(form.boundary()))
        } else {
            request.multipart(form)
        };

        let response = request.send().await?;
        self.handle_response(response).await
    }

    // =============================================================================
    // Listing and Download
    // =============================================================================

    pub async fn list_sources(&self, job_id: Uuid) -> Result<FileList> {
        let response = self
            .client
            .get(self.url(&format!("/storage/jobs/{}/sources", job_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    pub async fn download_source(&self, job_id: Uuid, name: &str) -> Result<Download> {
        let response = self
            .client
            .get(self.url(&format!("/storage/jobs/{}/sources/{}", job_id, name)))
            .send()
            .await?;

        self.handle_raw_response(response).await.map(Download::new)
    }

    pub async fn list_results(&self, course_id: Uuid) -> Result<FileList> {
        let response = self
            .client
            .get(self.url(&format!("/storage/courses/{}/results", course_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    pub async fn download_result(&self, course_id: Uuid, name: &str) -> Result<Download> {
        let response = self
            .client
            .get(self.url(&format!("/storage/courses/{}/results/{}", course_id, name)))
            .send()
            .await?;

        self.handle_raw_response(response).await.map(Download::new)
    }

    /// Fetch the worker's processing log for a job as plain text
    pub async fn job_logs(&self, job_id: Uuid) -> Result<String> {
        let response = self
            .client
            .get(self.url(&format!("/storage/jobs/{}/logs", job_id)))
            .send()
            .await?;

        Ok(self.handle_raw_response(response).await?.text().await?)
    }

    pub async fn storage_info(&self) -> Result<StorageInfo> {
        let response = self.client.get(self.url("/storage/info")).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_content_type() {
        assert_eq!(detect_content_type("slides.md"), "text/markdown");
        assert_eq!(detect_content_type("styles/theme.SCSS"), "text/scss");
        assert_eq!(detect_content_type("components/Hero.vue"), "text/x-vue");
        assert_eq!(detect_content_type("config.yml"), "application/yaml");
        assert_eq!(detect_content_type("images/photo.JPEG"), "image/jpeg");
        assert_eq!(detect_content_type("fonts/inter.woff2"), "application/octet-stream");
        assert_eq!(detect_content_type("LICENSE"), "application/octet-stream");
    }

    #[test]
    fn test_named_part_rejects_bad_mime() {
        let result = named_part(Part::bytes(vec![1, 2, 3]), "data.bin", Some("not a mime"));
        assert!(matches!(result, Err(ClientError::RequestFailed(_))));
    }

    #[test]
    fn test_empty_multipart_body_is_terminated() {
        assert_eq!(empty_multipart_body("b0undary"), "--b0undary--\r\n");
    }
}
