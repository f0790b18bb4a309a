//! Slipway Testkit
//!
//! An in-process fake of the generation worker and of the code host's branch
//! archive endpoint, for integration tests.
//!
//! ```no_run
//! use slipway_testkit::{FakeWorker, PollStep};
//! use slipway_core::domain::job::JobStatus;
//!
//! # async fn example() -> std::io::Result<()> {
//! let worker = FakeWorker::start().await?;
//! worker.set_poll_script(vec![PollStep::Status(JobStatus::Completed)]);
//! println!("worker listening on {}", worker.base_url());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod state;

use std::io::{Cursor, Write};
use std::net::SocketAddr;

use slipway_core::domain::health::HealthStatus;
use slipway_core::domain::job::{GenerationRequest, Job};
use slipway_core::domain::theme::{Theme, ThemeAutoInstall, ThemeDetection};
use slipway_core::domain::worker::Workspace;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub use state::{ArchiveRequest, Injected, JobRecord, PollStep, SharedState, StoredFile, job_snapshot};

/// Fake worker bound to an ephemeral local port
///
/// The server task is aborted when the handle is dropped.
#[derive(Debug)]
pub struct FakeWorker {
    addr: SocketAddr,
    state: SharedState,
    server: JoinHandle<()>,
}

impl FakeWorker {
    /// Start a fake worker on `127.0.0.1` with default behavior
    pub async fn start() -> std::io::Result<Self> {
        Self::serve(SharedState::default(), "127.0.0.1:0").await
    }

    /// Serve `state` on `addr`
    pub async fn serve(state: SharedState, addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let app = api::create_router(state.clone());

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Fake worker stopped: {}", e);
            }
        });

        tracing::debug!("Fake worker listening on {}", addr);
        Ok(Self { addr, state, server })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Root URL; the worker API lives under `/api/v1`, the code host at the root
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    // =============================================================================
    // Scripting
    // =============================================================================

    /// Script the statuses reported for jobs submitted from now on
    pub fn set_poll_script(&self, steps: Vec<PollStep>) {
        self.state.lock().default_script = steps;
    }

    /// Register an existing job without going through submission
    pub fn insert_job(&self, job: Job, steps: Vec<PollStep>) {
        self.state.lock().jobs.insert(job.id, JobRecord::new(job, steps));
    }

    pub fn fail_submission(&self, status: u16, message: impl Into<String>) {
        self.state.lock().submit_error = Some(Injected {
            status,
            message: message.into(),
        });
    }

    pub fn set_health(&self, status: HealthStatus) {
        self.state.lock().health = status;
    }

    pub fn require_token(&self, token: impl Into<String>) {
        self.state.lock().required_token = Some(token.into());
    }

    pub fn set_job_logs(&self, job_id: Uuid, logs: impl Into<String>) {
        self.state.lock().job_logs.insert(job_id, logs.into());
    }

    /// Serve a zip of `files` as every course archive, and list them as results
    pub fn set_result_files(&self, files: &[(&str, &[u8])]) -> zip::result::ZipResult<()> {
        let archive = zip_bytes(files)?;
        let mut state = self.state.lock();
        state.archive = Some(archive);
        state.results = files
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_vec()))
            .collect();
        Ok(())
    }

    /// Serve raw bytes as every course archive
    pub fn set_archive(&self, bytes: Vec<u8>) {
        self.state.lock().archive = Some(bytes);
    }

    pub fn set_themes(&self, themes: Vec<Theme>) {
        self.state.lock().themes = themes;
    }

    pub fn set_theme_detection(&self, detection: ThemeDetection) {
        self.state.lock().detection = detection;
    }

    pub fn set_theme_report(&self, report: ThemeAutoInstall) {
        self.state.lock().theme_report = report;
    }

    pub fn fail_theme_install(&self, status: u16, message: impl Into<String>) {
        self.state.lock().theme_error = Some(Injected {
            status,
            message: message.into(),
        });
    }

    pub fn add_workspace(&self, workspace: Workspace) {
        self.state.lock().workspaces.insert(workspace.job_id, workspace);
    }

    /// Publish a branch snapshot at `/{owner}/{repo}/archive/refs/heads/{branch}.zip`
    pub fn add_repository(&self, owner: &str, repo: &str, branch: &str, archive: Vec<u8>) {
        self.state
            .lock()
            .repositories
            .insert(format!("{}/{}/{}", owner, repo, branch), archive);
    }

    // =============================================================================
    // Inspection
    // =============================================================================

    /// Number of status requests received for a job
    pub fn poll_count(&self, job_id: Uuid) -> usize {
        self.state.lock().jobs.get(&job_id).map(|r| r.polls).unwrap_or(0)
    }

    pub fn submitted(&self) -> Vec<GenerationRequest> {
        self.state.lock().submitted.clone()
    }

    pub fn uploaded_files(&self, job_id: Uuid) -> Vec<StoredFile> {
        self.state.lock().uploads.get(&job_id).cloned().unwrap_or_default()
    }

    pub fn archive_requests(&self) -> Vec<ArchiveRequest> {
        self.state.lock().archive_requests.clone()
    }

    pub fn theme_calls(&self) -> usize {
        self.state.lock().theme_calls
    }

    pub fn repository_downloads(&self) -> usize {
        self.state.lock().repository_downloads
    }
}

impl Drop for FakeWorker {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Build a deflated zip archive in memory
///
/// Names ending in `/` become directory entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options)?;
        } else {
            writer.start_file(*name, options)?;
            writer.write_all(content)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}
