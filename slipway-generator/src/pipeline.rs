//! Generation pipeline
//!
//! Runs the stages strictly in order and stops at the first failing one.

use std::future::Future;
use std::sync::Arc;

use slipway_client::WorkerClient;
use slipway_core::domain::job::GenerationRequest;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GeneratorConfig;
use crate::error::{GenerateError, WaitError};
use crate::repository::{ArchiveRepository, JobRepository, SourceRepository, ThemeRepository};
use crate::service::{
    ArchiveResult, GithubFetcher, JobPoller, RepositoryRef, ResultMaterializer, SourceFetcher,
    SourceUploader, ThemeResolver,
};

const GENERATOR_NAME: &str = "slipway";

/// Outcome of a successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub job_id: Uuid,
    pub course_id: Uuid,
    pub archive: ArchiveResult,
}

/// Stage dependencies of a [`Generator`]
pub struct Stages {
    pub fetcher: Arc<dyn SourceFetcher>,
    pub jobs: Arc<dyn JobRepository>,
    pub sources: Arc<dyn SourceRepository>,
    pub themes: Arc<dyn ThemeRepository>,
    pub archives: Arc<dyn ArchiveRepository>,
}

impl Stages {
    /// Every worker stage served by one client, sources fetched from `archive_base`
    pub fn remote(client: WorkerClient, archive_base: &str) -> Self {
        let client = Arc::new(client);
        Self {
            fetcher: Arc::new(GithubFetcher::new(archive_base)),
            jobs: client.clone(),
            sources: client.clone(),
            themes: client.clone(),
            archives: client,
        }
    }
}

/// Orchestrates one generation run
pub struct Generator {
    config: GeneratorConfig,
    source: RepositoryRef,
    fetcher: Arc<dyn SourceFetcher>,
    jobs: Arc<dyn JobRepository>,
    uploader: SourceUploader,
    resolver: ThemeResolver,
    poller: JobPoller,
    materializer: ResultMaterializer,
}

impl Generator {
    /// Build a generator talking to the worker described by `config`
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        config.validate()?;
        let client = WorkerClient::from_config(&config.client).map_err(GenerateError::Client)?;
        let stages = Stages::remote(client, &config.archive_base);
        Self::with_stages(config, stages)
    }

    /// Build a generator from explicit stage implementations
    pub fn with_stages(config: GeneratorConfig, stages: Stages) -> Result<Self, GenerateError> {
        config.validate()?;
        let mut source = RepositoryRef::parse(&config.github_url)?;
        if let Some(subfolder) = &config.subfolder {
            source = source.with_subfolder(subfolder);
        }

        Ok(Self {
            uploader: SourceUploader::new(stages.sources, config.upload_mode),
            resolver: ThemeResolver::new(stages.themes),
            poller: JobPoller::new(stages.jobs.clone()),
            materializer: ResultMaterializer::new(stages.archives),
            fetcher: stages.fetcher,
            jobs: stages.jobs,
            source,
            config,
        })
    }

    pub fn source(&self) -> &RepositoryRef {
        &self.source
    }

    /// Run the whole pipeline
    ///
    /// Cancelling `cancel` stops the run at the current stage; while waiting
    /// for the job it ends the wait with [`WaitError::Cancelled`].
    pub async fn generate(&self, cancel: &CancellationToken) -> Result<GenerationResult, GenerateError> {
        info!(url = %self.config.github_url, source = %self.source, "Starting generation");

        until_cancelled(cancel, "health check", self.check_health()).await??;

        let job_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        info!(job_id = %job_id, course_id = %course_id, "Assigned job identifiers");

        // Removed when dropped at the end of the run, whatever its outcome
        let staging = tempfile::Builder::new()
            .prefix("slipway-")
            .tempdir()
            .map_err(GenerateError::Staging)?;

        let files = until_cancelled(cancel, "fetch", self.fetcher.fetch(&self.source, staging.path())).await??;

        until_cancelled(cancel, "upload", self.uploader.upload(job_id, &files))
            .await?
            .map_err(GenerateError::Upload)?;

        until_cancelled(cancel, "theme resolution", self.resolver.resolve(job_id)).await?;

        let request = GenerationRequest::new(job_id, course_id, self.config.source_path.clone())
            .with_metadata("generator", GENERATOR_NAME)
            .with_metadata("source", "github")
            .with_metadata("url", self.config.github_url.clone());

        if let Err(e) = self
            .poller
            .submit_and_wait(&request, &self.config.wait, cancel)
            .await
        {
            self.report_job_logs(job_id, &e).await;
            return Err(e.into());
        }

        let archive = until_cancelled(
            cancel,
            "materialize",
            self.materializer.materialize(course_id, &self.config.output_dir),
        )
        .await??;

        info!(
            job_id = %job_id,
            entry_point = ?archive.entry_point,
            "Generation finished"
        );

        Ok(GenerationResult {
            job_id,
            course_id,
            archive,
        })
    }

    /// Liveness check; only a transport or API failure stops the run
    async fn check_health(&self) -> Result<(), GenerateError> {
        let report = self.jobs.health().await.map_err(GenerateError::Health)?;

        if report.status.is_healthy() {
            info!(service = %report.service, status = %report.status, "Worker is healthy");
        } else {
            warn!(service = %report.service, status = %report.status, "Worker reports degraded health, continuing");
        }
        Ok(())
    }

    /// Log the worker's processing log after a failed wait, best effort
    async fn report_job_logs(&self, job_id: Uuid, error: &WaitError) {
        if !error.was_submitted() || error.is_cancelled() {
            return;
        }

        match self.jobs.job_logs(job_id).await {
            Ok(logs) if !logs.is_empty() => {
                warn!(job_id = %job_id, "Worker log for failed job:\n{}", logs);
            }
            Ok(_) => debug!(job_id = %job_id, "Worker log is empty"),
            Err(e) => debug!(job_id = %job_id, error = %e, "Could not retrieve worker log"),
        }
    }
}

/// Run `stage` unless `cancel` fires first
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    stage: &'static str,
    work: impl Future<Output = T>,
) -> Result<T, GenerateError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GenerateError::Cancelled { stage }),
        output = work => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::repository::{
        MockArchiveRepository, MockJobRepository, MockSourceRepository, MockThemeRepository,
    };
    use crate::service::FetchedFile;
    use crate::service::fetcher::MockSourceFetcher;
    use crate::WaitSpec;
    use slipway_client::ClientError;
    use slipway_core::domain::health::{HealthReport, HealthStatus};
    use slipway_core::domain::job::{Job, JobStatus};
    use slipway_core::domain::storage::UploadReceipt;
    use slipway_core::domain::theme::ThemeAutoInstall;
    use slipway_testkit::{job_snapshot, zip_bytes};
    use std::time::Duration;

    struct Mocks {
        fetcher: MockSourceFetcher,
        jobs: MockJobRepository,
        sources: MockSourceRepository,
        themes: MockThemeRepository,
        archives: MockArchiveRepository,
    }

    impl Mocks {
        /// Every stage succeeds; the job completes on the first poll
        fn happy() -> Self {
            let mut fetcher = MockSourceFetcher::new();
            fetcher.expect_fetch().returning(|_, staging| {
                let local_path = staging.join("slides.md");
                std::fs::write(&local_path, "# Deck")?;
                Ok(vec![FetchedFile {
                    relative_path: "slides.md".to_string(),
                    local_path,
                    content_type: "text/markdown".to_string(),
                    size: 6,
                }])
            });

            let mut jobs = MockJobRepository::new();
            jobs.expect_health().returning(|| {
                Ok(HealthReport {
                    status: HealthStatus::Healthy,
                    ..Default::default()
                })
            });
            jobs.expect_submit_job()
                .returning(|r| Ok(job_snapshot(r.job_id, r.course_id, JobStatus::Pending)));
            jobs.expect_get_job()
                .returning(|id| Ok(job_snapshot(id, Uuid::new_v4(), JobStatus::Completed)));

            let mut sources = MockSourceRepository::new();
            sources.expect_upload_sources().returning(|_, files| {
                Ok(UploadReceipt {
                    count: files.len(),
                    ..Default::default()
                })
            });

            let mut themes = MockThemeRepository::new();
            themes
                .expect_auto_install_themes()
                .returning(|_| Ok(ThemeAutoInstall::default()));

            let mut archives = MockArchiveRepository::new();
            archives.expect_download_archive().returning(|_, _, dest| {
                let bytes = zip_bytes(&[("index.html", "<html></html>".as_bytes())])
                    .map_err(|e| ClientError::ParseError(e.to_string()))?;
                std::fs::write(dest, &bytes)?;
                Ok(bytes.len() as u64)
            });

            Self {
                fetcher,
                jobs,
                sources,
                themes,
                archives,
            }
        }

        fn into_stages(self) -> Stages {
            Stages {
                fetcher: Arc::new(self.fetcher),
                jobs: Arc::new(self.jobs),
                sources: Arc::new(self.sources),
                themes: Arc::new(self.themes),
                archives: Arc::new(self.archives),
            }
        }
    }

    fn config(output: &std::path::Path) -> GeneratorConfig {
        GeneratorConfig::new("https://github.com/acme/deck", "http://localhost:8081")
            .with_output_dir(output)
            .with_wait(WaitSpec::new(Duration::from_millis(10), Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn test_generate_runs_every_stage() {
        let output = tempfile::tempdir().unwrap();
        let generator = Generator::with_stages(config(output.path()), Mocks::happy().into_stages()).unwrap();

        let result = generator.generate(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            result.archive.entry_point,
            Some(output.path().join("presentation").join("index.html"))
        );
        assert_eq!(result.archive.files.len(), 1);
        assert_ne!(result.job_id, result.course_id);
    }

    #[tokio::test]
    async fn test_submit_carries_source_metadata() {
        let output = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::happy();
        mocks.jobs.checkpoint();
        mocks.jobs.expect_health().returning(|| Ok(HealthReport::default()));
        mocks
            .jobs
            .expect_submit_job()
            .withf(|r| {
                r.source_path == "slides.md"
                    && r.metadata["generator"] == "slipway"
                    && r.metadata["source"] == "github"
                    && r.metadata["url"] == "https://github.com/acme/deck"
            })
            .times(1)
            .returning(|r| Ok(job_snapshot(r.job_id, r.course_id, JobStatus::Pending)));
        mocks
            .jobs
            .expect_get_job()
            .returning(|id| Ok(job_snapshot(id, Uuid::new_v4(), JobStatus::Completed)));

        let generator = Generator::with_stages(config(output.path()), mocks.into_stages()).unwrap();
        generator.generate(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_worker_stops_before_fetch() {
        let output = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::happy();
        mocks.jobs.checkpoint();
        mocks
            .jobs
            .expect_health()
            .returning(|| Err(ClientError::api_error(502, "bad gateway")));
        mocks.fetcher.checkpoint();
        mocks.fetcher.expect_fetch().never();

        let generator = Generator::with_stages(config(output.path()), mocks.into_stages()).unwrap();
        let err = generator.generate(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, GenerateError::Health(_)));
    }

    #[tokio::test]
    async fn test_no_matching_files_aborts() {
        let output = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::happy();
        mocks.fetcher.checkpoint();
        mocks.fetcher.expect_fetch().returning(|_, _| {
            Err(FetchError::NoMatchingFiles {
                url: "https://github.com/acme/deck/archive/refs/heads/main.zip".to_string(),
            })
        });
        mocks.sources.checkpoint();
        mocks.sources.expect_upload_sources().never();

        let generator = Generator::with_stages(config(output.path()), mocks.into_stages()).unwrap();
        let err = generator.generate(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, GenerateError::Fetch(FetchError::NoMatchingFiles { .. })));
    }

    #[tokio::test]
    async fn test_failed_job_fetches_logs() {
        let output = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::happy();
        mocks.jobs.checkpoint();
        mocks.jobs.expect_health().returning(|| Ok(HealthReport::default()));
        mocks
            .jobs
            .expect_submit_job()
            .returning(|r| Ok(job_snapshot(r.job_id, r.course_id, JobStatus::Pending)));
        mocks.jobs.expect_get_job().returning(|id| {
            let mut job = job_snapshot(id, Uuid::new_v4(), JobStatus::Failed);
            job.error = Some("build exited with 1".to_string());
            Ok(job)
        });
        mocks
            .jobs
            .expect_job_logs()
            .times(1)
            .returning(|_| Ok("vite build failed".to_string()));
        mocks.archives.checkpoint();
        mocks.archives.expect_download_archive().never();

        let generator = Generator::with_stages(config(output.path()), mocks.into_stages()).unwrap();
        let err = generator.generate(&CancellationToken::new()).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("job failed with status failed: build exited with 1"));
    }

    #[tokio::test]
    async fn test_theme_failure_is_advisory() {
        let output = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::happy();
        mocks.themes.checkpoint();
        mocks
            .themes
            .expect_auto_install_themes()
            .times(1)
            .returning(|_| Err(ClientError::api_error(500, "npm unavailable")));

        let generator = Generator::with_stages(config(output.path()), mocks.into_stages()).unwrap();
        assert!(generator.generate(&CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let output = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let generator = Generator::with_stages(config(output.path()), Mocks::happy().into_stages()).unwrap();
        let err = generator.generate(&cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert!(matches!(err, GenerateError::Cancelled { stage: "health check" }));
    }

    /// Health check that never answers
    struct UnresponsiveWorker;

    #[async_trait::async_trait]
    impl JobRepository for UnresponsiveWorker {
        async fn health(&self) -> Result<HealthReport, ClientError> {
            std::future::pending().await
        }

        async fn submit_job(&self, request: &GenerationRequest) -> Result<Job, ClientError> {
            Ok(job_snapshot(request.job_id, request.course_id, JobStatus::Pending))
        }

        async fn get_job(&self, job_id: Uuid) -> Result<Job, ClientError> {
            Ok(job_snapshot(job_id, Uuid::new_v4(), JobStatus::Completed))
        }

        async fn job_logs(&self, _job_id: Uuid) -> Result<String, ClientError> {
            Ok(String::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_health_check() {
        let output = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::happy();
        mocks.fetcher.checkpoint();
        mocks.fetcher.expect_fetch().never();
        let mut stages = mocks.into_stages();
        stages.jobs = Arc::new(UnresponsiveWorker);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let generator = Generator::with_stages(config(output.path()), stages).unwrap();
        let err = generator.generate(&cancel).await.unwrap_err();

        assert!(matches!(err, GenerateError::Cancelled { stage: "health check" }));
    }

    #[test]
    fn test_subfolder_is_applied_to_source() {
        let output = tempfile::tempdir().unwrap();
        let config = config(output.path()).with_subfolder("talks/intro");

        let generator = Generator::with_stages(config, Mocks::happy().into_stages()).unwrap();
        assert_eq!(generator.source().sub_path.as_deref(), Some("talks/intro"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GeneratorConfig::new("https://example.com/acme/deck", "http://localhost:8081");
        let err = Generator::with_stages(config, Mocks::happy().into_stages()).err().unwrap();
        assert!(matches!(err, GenerateError::Config(_)));
    }
}
