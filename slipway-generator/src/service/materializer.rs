//! Result materializer
//!
//! Downloads the course archive, unpacks it and finds the presentation's
//! entry point.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use slipway_client::ArchiveOptions;
use tracing::info;
use uuid::Uuid;
use zip::ZipArchive;

use crate::error::MaterializeError;
use crate::repository::ArchiveRepository;

const ARCHIVE_NAME: &str = "presentation.zip";
const EXTRACT_DIR: &str = "presentation";
const ENTRY_POINT: &str = "index.html";

/// Unpacked generation output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResult {
    pub output_dir: PathBuf,
    /// `index.html` to open, `None` when the archive has none
    pub entry_point: Option<PathBuf>,
    pub archive_path: PathBuf,
    pub files: Vec<PathBuf>,
}

pub struct ResultMaterializer {
    archives: Arc<dyn ArchiveRepository>,
}

impl ResultMaterializer {
    pub fn new(archives: Arc<dyn ArchiveRepository>) -> Self {
        Self { archives }
    }

    /// Download and unpack the archive for `course_id` into `output_dir`
    pub async fn materialize(&self, course_id: Uuid, output_dir: &Path) -> Result<ArchiveResult, MaterializeError> {
        tokio::fs::create_dir_all(output_dir).await?;

        let archive_path = output_dir.join(ARCHIVE_NAME);
        let size = self
            .archives
            .download_archive(course_id, &ArchiveOptions::zip(), &archive_path)
            .await
            .map_err(MaterializeError::Download)?;
        info!(course_id = %course_id, size, path = %archive_path.display(), "Archive downloaded");

        let extract_dir = output_dir.join(EXTRACT_DIR);
        let files = {
            let archive_path = archive_path.clone();
            let extract_dir = extract_dir.clone();
            tokio::task::spawn_blocking(move || extract_archive(&archive_path, &extract_dir)).await??
        };

        let entry_point = find_entry_point(&files);
        info!(
            count = files.len(),
            dir = %extract_dir.display(),
            entry_point = ?entry_point,
            "Presentation extracted"
        );

        Ok(ArchiveResult {
            output_dir: output_dir.to_path_buf(),
            entry_point,
            archive_path,
            files,
        })
    }
}

/// Unpack every file of `archive` under `dest`
///
/// # Returns
/// The extracted file paths, in archive order
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, MaterializeError> {
    let mut zip = ZipArchive::new(std::fs::File::open(archive)?)?;
    std::fs::create_dir_all(dest)?;
    let mut files = Vec::new();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| MaterializeError::UnsafeEntry(entry.name().to_string()))?;
        let path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&path)?;
            continue;
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&path)?;
        io::copy(&mut entry, &mut out)?;
        files.push(path);
    }

    Ok(files)
}

/// Shallowest `index.html` among `files`, ties broken by path
pub fn find_entry_point(files: &[PathBuf]) -> Option<PathBuf> {
    files
        .iter()
        .filter(|p| p.file_name() == Some(OsStr::new(ENTRY_POINT)))
        .min_by(|a, b| {
            let depth = |p: &Path| p.components().count();
            depth(a).cmp(&depth(b)).then_with(|| a.cmp(b))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockArchiveRepository;
    use slipway_client::ClientError;
    use slipway_testkit::zip_bytes;

    fn serving(bytes: Vec<u8>) -> MockArchiveRepository {
        let mut archives = MockArchiveRepository::new();
        archives
            .expect_download_archive()
            .withf(|_, options, _| {
                options.format == Some(slipway_client::ArchiveFormat::Zip)
                    && options.compress == Some(true)
            })
            .times(1)
            .returning(move |_, _, dest| {
                std::fs::write(dest, &bytes)?;
                Ok(bytes.len() as u64)
            });
        archives
    }

    #[tokio::test]
    async fn test_materialize_extracts_and_finds_root_entry() {
        let bytes = zip_bytes(&[
            ("index.html", "<html></html>".as_bytes()),
            ("assets/", "".as_bytes()),
            ("assets/app.js", "console.log(1)".as_bytes()),
        ])
        .unwrap();
        let output = tempfile::tempdir().unwrap();

        let materializer = ResultMaterializer::new(Arc::new(serving(bytes)));
        let result = materializer
            .materialize(Uuid::new_v4(), output.path())
            .await
            .unwrap();

        let extract_dir = output.path().join("presentation");
        assert_eq!(result.archive_path, output.path().join("presentation.zip"));
        assert_eq!(result.entry_point, Some(extract_dir.join("index.html")));
        assert_eq!(result.files.len(), 2);
        assert!(extract_dir.join("assets/app.js").is_file());
    }

    #[tokio::test]
    async fn test_missing_entry_point_is_not_an_error() {
        let bytes = zip_bytes(&[
            ("slides/1.html", "<p>1</p>".as_bytes()),
            ("slides/2.html", "<p>2</p>".as_bytes()),
        ])
        .unwrap();
        let output = tempfile::tempdir().unwrap();

        let materializer = ResultMaterializer::new(Arc::new(serving(bytes)));
        let result = materializer
            .materialize(Uuid::new_v4(), output.path())
            .await
            .unwrap();

        assert_eq!(result.entry_point, None);
        assert_eq!(result.files.len(), 2);
    }

    #[tokio::test]
    async fn test_download_failure_is_reported() {
        let mut archives = MockArchiveRepository::new();
        archives
            .expect_download_archive()
            .returning(|_, _, _| Err(ClientError::api_error(404, "course not found")));
        let output = tempfile::tempdir().unwrap();

        let materializer = ResultMaterializer::new(Arc::new(archives));
        let err = materializer
            .materialize(Uuid::new_v4(), output.path())
            .await
            .unwrap_err();

        assert!(matches!(err, MaterializeError::Download(ref e) if e.is_not_found()));
    }

    #[test]
    fn test_entry_point_prefers_shallowest() {
        let files = vec![
            PathBuf::from("out/presentation/b/deep/index.html"),
            PathBuf::from("out/presentation/z/index.html"),
            PathBuf::from("out/presentation/a/index.html"),
            PathBuf::from("out/presentation/a/app.js"),
        ];
        assert_eq!(
            find_entry_point(&files),
            Some(PathBuf::from("out/presentation/a/index.html"))
        );
    }

    #[test]
    fn test_extract_rejects_escaping_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        std::fs::write(&archive, zip_bytes(&[("../../outside.html", "x".as_bytes())]).unwrap()).unwrap();

        let err = extract_archive(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, MaterializeError::UnsafeEntry(_)));
    }
}
