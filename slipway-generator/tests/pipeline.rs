use std::path::Path;
use std::time::Duration;

use slipway_core::domain::health::HealthStatus;
use slipway_core::domain::job::JobStatus;
use slipway_generator::{
    FetchError, GenerateError, GeneratorConfig, Generator, UploadMode, WaitError, WaitSpec,
};
use slipway_testkit::{FakeWorker, PollStep, zip_bytes};
use tokio_util::sync::CancellationToken;

const REPO_URL: &str = "https://github.com/acme/deck";

async fn setup() -> FakeWorker {
    let worker = FakeWorker::start().await.unwrap();
    let snapshot = zip_bytes(&[
        ("deck-main/", "".as_bytes()),
        ("deck-main/slides.md", "# Welcome".as_bytes()),
        ("deck-main/style.css", "h1 { color: red }".as_bytes()),
        ("deck-main/build.sh", "#!/bin/sh".as_bytes()),
        ("deck-main/talks/intro/slides.md", "# Intro".as_bytes()),
        ("deck-main/talks/intro/logo.png", b"\x89PNG".as_slice()),
    ])
    .unwrap();
    worker.add_repository("acme", "deck", "main", snapshot);
    worker
        .set_result_files(&[
            ("index.html", "<html></html>".as_bytes()),
            ("assets/index.js", "console.log(1)".as_bytes()),
        ])
        .unwrap();
    worker
}

fn config(worker: &FakeWorker, url: &str, output: &Path) -> GeneratorConfig {
    GeneratorConfig::new(url, worker.base_url())
        .with_archive_base(worker.base_url())
        .with_output_dir(output)
        .with_wait(WaitSpec::new(Duration::from_millis(20), Duration::from_secs(10)))
}

async fn run(config: GeneratorConfig) -> Result<slipway_generator::GenerationResult, GenerateError> {
    Generator::new(config)?.generate(&CancellationToken::new()).await
}

#[tokio::test]
async fn test_generate_end_to_end() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();

    let result = run(config(&worker, REPO_URL, output.path())).await.unwrap();

    assert_eq!(worker.repository_downloads(), 1);
    assert_eq!(worker.poll_count(result.job_id), 3);

    let mut uploaded: Vec<String> = worker
        .uploaded_files(result.job_id)
        .into_iter()
        .map(|f| f.name)
        .collect();
    uploaded.sort();
    assert_eq!(
        uploaded,
        vec!["slides.md", "style.css", "talks/intro/logo.png", "talks/intro/slides.md"]
    );

    let submitted = worker.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].job_id, result.job_id);
    assert_eq!(submitted[0].course_id, result.course_id);
    assert_eq!(submitted[0].source_path, "slides.md");
    assert_eq!(submitted[0].metadata["url"], REPO_URL);

    let archive_requests = worker.archive_requests();
    assert_eq!(archive_requests.len(), 1);
    assert_eq!(archive_requests[0].course_id, result.course_id);
    assert_eq!(archive_requests[0].format.as_deref(), Some("zip"));
    assert_eq!(archive_requests[0].compress.as_deref(), Some("true"));

    let presentation = output.path().join("presentation");
    assert_eq!(result.archive.entry_point, Some(presentation.join("index.html")));
    assert_eq!(result.archive.files.len(), 2);
    assert!(output.path().join("presentation.zip").is_file());
    assert_eq!(
        std::fs::read_to_string(presentation.join("assets/index.js")).unwrap(),
        "console.log(1)"
    );
}

#[tokio::test]
async fn test_subfolder_uploads_relative_to_folder() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();

    let config = config(&worker, REPO_URL, output.path()).with_subfolder("talks/intro");
    let result = run(config).await.unwrap();

    let mut uploaded: Vec<String> = worker
        .uploaded_files(result.job_id)
        .into_iter()
        .map(|f| f.name)
        .collect();
    uploaded.sort();
    assert_eq!(uploaded, vec!["logo.png", "slides.md"]);
}

#[tokio::test]
async fn test_tree_url_selects_branch_and_folder() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();

    let url = "https://github.com/acme/deck/tree/main/talks/intro";
    let result = run(config(&worker, url, output.path())).await.unwrap();

    let files = worker.uploaded_files(result.job_id);
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f.name == "slides.md" && f.content == b"# Intro"));
}

#[tokio::test]
async fn test_streaming_upload_matches_in_memory() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();

    let config = config(&worker, REPO_URL, output.path()).with_upload_mode(UploadMode::Streaming);
    let result = run(config).await.unwrap();

    let files = worker.uploaded_files(result.job_id);
    assert_eq!(files.len(), 4);
    let slides = files.iter().find(|f| f.name == "slides.md").unwrap();
    assert_eq!(slides.content, b"# Welcome");
    assert_eq!(slides.content_type.as_deref(), Some("text/markdown"));
}

#[tokio::test]
async fn test_failed_job_reports_worker_message() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();
    worker.set_poll_script(vec![
        PollStep::Status(JobStatus::Processing),
        PollStep::Fail {
            status: JobStatus::Failed,
            message: "theme seriph not installed".to_string(),
        },
    ]);

    let err = run(config(&worker, REPO_URL, output.path())).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("failed"), "{message}");
    assert!(message.contains("theme seriph not installed"), "{message}");
    assert!(worker.archive_requests().is_empty());
    assert!(!output.path().join("presentation").exists());
}

#[tokio::test]
async fn test_vanished_job_fails_after_one_poll() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();
    worker.set_poll_script(vec![PollStep::NotFound]);

    let err = run(config(&worker, REPO_URL, output.path())).await.unwrap_err();

    let GenerateError::Generation(WaitError::JobNotFound { job_id }) = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(worker.poll_count(job_id), 1);
}

#[tokio::test]
async fn test_theme_install_failure_is_advisory() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();
    worker.fail_theme_install(500, "npm registry unreachable");

    let result = run(config(&worker, REPO_URL, output.path())).await;

    assert!(result.is_ok());
    assert_eq!(worker.theme_calls(), 1);
}

#[tokio::test]
async fn test_degraded_worker_still_generates() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();
    worker.set_health(HealthStatus::Degraded);

    assert!(run(config(&worker, REPO_URL, output.path())).await.is_ok());
}

#[tokio::test]
async fn test_unsupported_folder_is_rejected_before_submission() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();

    let config = config(&worker, REPO_URL, output.path()).with_subfolder("docs");
    let err = run(config).await.unwrap_err();

    assert!(matches!(err, GenerateError::Fetch(FetchError::NoMatchingFiles { .. })));
    assert!(worker.submitted().is_empty());
}

#[tokio::test]
async fn test_missing_branch_reports_status() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();

    let url = "https://github.com/acme/deck/tree/gone";
    let err = run(config(&worker, url, output.path())).await.unwrap_err();

    assert!(matches!(err, GenerateError::Fetch(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_local_wait_timeout() {
    let worker = setup().await;
    let output = tempfile::tempdir().unwrap();
    worker.set_poll_script(vec![PollStep::Status(JobStatus::Processing)]);

    let config = config(&worker, REPO_URL, output.path())
        .with_wait(WaitSpec::new(Duration::from_millis(20), Duration::from_millis(100)));
    let err = run(config).await.unwrap_err();

    assert!(matches!(
        err,
        GenerateError::Generation(WaitError::WaitTimeout {
            last_status: Some(JobStatus::Processing),
            ..
        })
    ));
    assert!(err.to_string().contains("timeout waiting for job"));
}
