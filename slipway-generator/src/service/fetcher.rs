//! Source fetcher
//!
//! Downloads a branch snapshot from the code host and stages the files the
//! worker can render.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use slipway_client::detect_content_type;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::FetchError;

pub const GITHUB_PREFIX: &str = "https://github.com/";

const DEFAULT_BRANCH: &str = "main";
const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "md", "css", "scss", "less", "js", "ts", "vue", "json", "yaml", "yml", "png", "jpg", "jpeg",
    "gif", "svg", "woff", "woff2", "ttf", "eot",
];
const SUPPORTED_BASENAMES: &[&str] = &["readme", "license"];

/// A staged source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    /// Path inside the presentation, `/`-separated
    pub relative_path: String,
    pub local_path: PathBuf,
    pub content_type: String,
    pub size: u64,
}

/// Repository branch, optionally narrowed to a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub sub_path: Option<String>,
}

impl RepositoryRef {
    /// Parse `https://github.com/<owner>/<repo>[/tree/<branch>[/<path>...]]`
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        let rest = url
            .strip_prefix(GITHUB_PREFIX)
            .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;
        let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();

        let (owner, repo) = match parts.as_slice() {
            [owner, repo, ..] if !owner.is_empty() && !repo.is_empty() => (*owner, *repo),
            _ => return Err(FetchError::InvalidUrl(url.to_string())),
        };

        let mut branch = DEFAULT_BRANCH;
        let mut sub_path = None;
        if parts.get(2) == Some(&"tree") {
            if let Some(b) = parts.get(3).filter(|b| !b.is_empty()) {
                branch = *b;
            }
            if parts.len() > 4 {
                sub_path = normalize_sub_path(&parts[4..].join("/"));
            }
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.trim_end_matches(".git").to_string(),
            branch: branch.to_string(),
            sub_path,
        })
    }

    /// Narrow further into `subfolder`, relative to the current sub-path
    pub fn with_subfolder(mut self, subfolder: &str) -> Self {
        let Some(subfolder) = normalize_sub_path(subfolder) else {
            return self;
        };
        self.sub_path = Some(match self.sub_path.take() {
            Some(base) => format!("{}/{}", base, subfolder),
            None => subfolder,
        });
        self
    }

    /// Branch snapshot URL on `base`
    pub fn archive_url(&self, base: &str) -> String {
        format!(
            "{}/{}/{}/archive/refs/heads/{}.zip",
            base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch
        )
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)?;
        if let Some(sub_path) = &self.sub_path {
            write!(f, ":{}", sub_path)?;
        }
        Ok(())
    }
}

fn normalize_sub_path(path: &str) -> Option<String> {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Whether the worker can use a file, judged by extension or well-known name
pub fn is_supported_file(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return true;
        }
    }

    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| SUPPORTED_BASENAMES.contains(&n.to_ascii_lowercase().as_str()))
}

/// Downloads and stages repository sources
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Stage the supported files of `source` under `staging`
    ///
    /// Fails with [`FetchError::NoMatchingFiles`] when nothing is left after filtering.
    async fn fetch(&self, source: &RepositoryRef, staging: &Path) -> Result<Vec<FetchedFile>, FetchError>;
}

/// Fetches branch snapshots over HTTP
#[derive(Debug, Clone)]
pub struct GithubFetcher {
    client: reqwest::Client,
    archive_base: String,
}

impl GithubFetcher {
    pub fn new(archive_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            archive_base: archive_base.into(),
        }
    }

    /// Stream the archive body into a temporary file
    async fn download(&self, url: &str) -> Result<tempfile::NamedTempFile, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Download {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let total = response.content_length();
        let archive = tempfile::Builder::new()
            .prefix("slipway-repo-")
            .suffix(".zip")
            .tempfile()?;
        let mut out = tokio::fs::File::from_std(archive.reopen()?);

        let mut downloaded = 0u64;
        let mut last_report = Instant::now();
        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Download {
            url: url.to_string(),
            source,
        })? {
            out.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if last_report.elapsed() >= PROGRESS_INTERVAL {
                info!(downloaded, total = ?total, "Downloading repository archive");
                last_report = Instant::now();
            }
        }
        out.flush().await?;

        debug!(downloaded, "Repository archive downloaded");
        Ok(archive)
    }
}

#[async_trait]
impl SourceFetcher for GithubFetcher {
    async fn fetch(&self, source: &RepositoryRef, staging: &Path) -> Result<Vec<FetchedFile>, FetchError> {
        let url = source.archive_url(&self.archive_base);
        info!(source = %source, url = %url, "Fetching repository snapshot");

        let archive = self.download(&url).await?;

        let staging = staging.to_path_buf();
        let sub_path = source.sub_path.clone();
        let files = tokio::task::spawn_blocking(move || {
            extract_sources(archive.path(), &staging, sub_path.as_deref())
        })
        .await??;

        if files.is_empty() {
            return Err(FetchError::NoMatchingFiles { url });
        }

        info!(count = files.len(), "Staged source files");
        Ok(files)
    }
}

/// Extract the supported files of a branch snapshot into `staging`
///
/// Every entry must sit under the snapshot's single top-level folder, which
/// is dropped; only entries under
/// `sub_path` are kept and `sub_path` itself is removed from their paths.
pub fn extract_sources(
    archive: &Path,
    staging: &Path,
    sub_path: Option<&str>,
) -> Result<Vec<FetchedFile>, FetchError> {
    let mut zip = ZipArchive::new(std::fs::File::open(archive)?)?;
    let sub_path = PathBuf::from(sub_path.unwrap_or_default());
    let mut files = Vec::new();
    let mut root: Option<OsString> = None;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let enclosed = entry
            .enclosed_name()
            .ok_or_else(|| FetchError::UnsafeEntry(entry.name().to_string()))?;

        let mut components = enclosed.components();
        let Some(top) = components.next().map(|c| c.as_os_str().to_os_string()) else {
            continue;
        };
        match &root {
            None => root = Some(top),
            Some(expected) if *expected != top => {
                return Err(FetchError::MixedRoots {
                    expected: expected.to_string_lossy().into_owned(),
                    found: entry.name().to_string(),
                });
            }
            Some(_) => {}
        }

        if entry.is_dir() {
            continue;
        }

        let Ok(relative) = components.as_path().strip_prefix(&sub_path) else {
            continue;
        };
        if relative.as_os_str().is_empty() || !is_supported_file(relative) {
            continue;
        }

        let local_path = staging.join(relative);
        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&local_path)?;
        let size = io::copy(&mut entry, &mut out)?;

        files.push(FetchedFile {
            relative_path: slash_path(relative),
            content_type: detect_content_type(relative).to_string(),
            local_path,
            size,
        });
    }

    Ok(files)
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
