//! Shared fake worker state
//!
//! Tests script the worker's behavior through [`crate::FakeWorker`]; handlers
//! read and record through the same state.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use slipway_core::domain::health::HealthStatus;
use slipway_core::domain::job::{GenerationRequest, Job, JobStatus};
use slipway_core::domain::theme::{Theme, ThemeAutoInstall, ThemeDetection};
use slipway_core::domain::worker::Workspace;
use uuid::Uuid;

/// What the worker answers to one status request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Report the job in this status
    Status(JobStatus),
    /// Report a terminal failure with an error message
    Fail { status: JobStatus, message: String },
    /// Answer 404, as if the job never existed
    NotFound,
    /// Answer with an error status and `{"error": ..}` body
    Error(u16),
}

impl PollStep {
    /// `pending`, `processing`, then `completed`
    pub fn happy_path() -> Vec<PollStep> {
        vec![
            PollStep::Status(JobStatus::Pending),
            PollStep::Status(JobStatus::Processing),
            PollStep::Status(JobStatus::Completed),
        ]
    }
}

/// A job known to the fake worker together with its remaining script
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job: Job,
    /// The last step repeats once the others are consumed
    pub script: VecDeque<PollStep>,
    pub polls: usize,
}

impl JobRecord {
    pub fn new(job: Job, script: Vec<PollStep>) -> Self {
        Self {
            job,
            script: script.into(),
            polls: 0,
        }
    }

    /// Advance the script by one poll
    pub fn next_step(&mut self) -> Option<PollStep> {
        self.polls += 1;
        if self.script.len() > 1 {
            self.script.pop_front()
        } else {
            self.script.front().cloned()
        }
    }
}

/// File received through a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

/// Query seen by the archive endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub course_id: Uuid,
    pub format: Option<String>,
    pub compress: Option<String>,
}

/// Error injected into an endpoint
#[derive(Debug, Clone)]
pub struct Injected {
    pub status: u16,
    pub message: String,
}

#[derive(Debug)]
pub struct WorkerState {
    pub jobs: HashMap<Uuid, JobRecord>,
    pub submitted: Vec<GenerationRequest>,
    pub default_script: Vec<PollStep>,
    pub submit_error: Option<Injected>,

    pub uploads: HashMap<Uuid, Vec<StoredFile>>,
    pub job_logs: HashMap<Uuid, String>,
    pub results: Vec<(String, Vec<u8>)>,
    pub archive: Option<Vec<u8>>,
    pub archive_requests: Vec<ArchiveRequest>,

    pub themes: Vec<Theme>,
    pub detection: ThemeDetection,
    pub theme_report: ThemeAutoInstall,
    pub theme_error: Option<Injected>,
    pub theme_calls: usize,

    pub health: HealthStatus,
    pub workspaces: HashMap<Uuid, Workspace>,
    pub required_token: Option<String>,

    /// Code host archives keyed by `owner/repo/branch`
    pub repositories: HashMap<String, Vec<u8>>,
    pub repository_downloads: usize,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self {
            jobs: HashMap::new(),
            submitted: Vec::new(),
            default_script: PollStep::happy_path(),
            submit_error: None,
            uploads: HashMap::new(),
            job_logs: HashMap::new(),
            results: Vec::new(),
            archive: None,
            archive_requests: Vec::new(),
            themes: Vec::new(),
            detection: ThemeDetection::default(),
            theme_report: ThemeAutoInstall::default(),
            theme_error: None,
            theme_calls: 0,
            health: HealthStatus::Healthy,
            workspaces: HashMap::new(),
            required_token: None,
            repositories: HashMap::new(),
            repository_downloads: 0,
        }
    }
}

impl WorkerState {
    /// Register a submitted request as a new pending job
    pub fn accept(&mut self, request: GenerationRequest) -> Job {
        let job = job_snapshot(request.job_id, request.course_id, JobStatus::Pending);
        self.jobs.insert(
            job.id,
            JobRecord::new(job.clone(), self.default_script.clone()),
        );
        self.submitted.push(request);
        job
    }
}

/// State handle shared by the router and the test harness
#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<Mutex<WorkerState>>);

impl SharedState {
    /// Lock the state; a panicking handler does not poison it for the test
    pub fn lock(&self) -> MutexGuard<'_, WorkerState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build a job snapshot with fresh timestamps
pub fn job_snapshot(job_id: Uuid, course_id: Uuid, status: JobStatus) -> Job {
    let now = Utc::now();
    Job {
        id: job_id,
        course_id,
        status,
        created_at: now,
        updated_at: now,
        started_at: (status != JobStatus::Pending).then_some(now),
        completed_at: status.is_terminal().then_some(now),
        progress: None,
        error: None,
        logs: Vec::new(),
    }
}
