//! Storage API Handlers
//!
//! Multipart source upload, stored file listing and the course archive.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use slipway_core::domain::storage::{FileList, StorageInfo, UploadReceipt};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::state::{ArchiveRequest, SharedState, StoredFile};

// =============================================================================
// Sources
// =============================================================================

/// POST /storage/jobs/{id}/sources
/// Store every `files` part; a well-formed body without parts stores nothing
pub async fn upload_sources(
    State(state): State<SharedState>,
    Path(job_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadReceipt>)> {
    let mut received = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("files") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("unreadable part {}: {}", name, e)))?;

        received.push(StoredFile {
            name,
            content_type,
            content: content.to_vec(),
        });
    }

    tracing::info!("Received {} source files for job {}", received.len(), job_id);

    let files: Vec<String> = received.iter().map(|f| f.name.clone()).collect();
    state
        .lock()
        .uploads
        .entry(job_id)
        .or_default()
        .extend(received);

    let receipt = UploadReceipt {
        count: files.len(),
        message: format!("{} files uploaded successfully", files.len()),
        files,
    };
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /storage/jobs/{id}/sources
pub async fn list_sources(State(state): State<SharedState>, Path(job_id): Path<Uuid>) -> Json<FileList> {
    let state = state.lock();
    let files: Vec<String> = state
        .uploads
        .get(&job_id)
        .map(|files| files.iter().map(|f| f.name.clone()).collect())
        .unwrap_or_default();

    Json(FileList {
        count: files.len(),
        files,
    })
}

/// GET /storage/jobs/{id}/sources/{*name}
pub async fn download_source(
    State(state): State<SharedState>,
    Path((job_id, name)): Path<(Uuid, String)>,
) -> ApiResult<Vec<u8>> {
    let state = state.lock();
    state
        .uploads
        .get(&job_id)
        .and_then(|files| files.iter().find(|f| f.name == name))
        .map(|f| f.content.clone())
        .ok_or_else(|| ApiError::NotFound(format!("Source {} not found", name)))
}

/// GET /storage/jobs/{id}/logs
pub async fn job_logs(State(state): State<SharedState>, Path(job_id): Path<Uuid>) -> ApiResult<String> {
    let state = state.lock();
    if !state.jobs.contains_key(&job_id) && !state.job_logs.contains_key(&job_id) {
        return Err(ApiError::NotFound(format!("Job {} not found", job_id)));
    }
    Ok(state.job_logs.get(&job_id).cloned().unwrap_or_default())
}

// =============================================================================
// Results
// =============================================================================

/// GET /storage/courses/{id}/results
pub async fn list_results(State(state): State<SharedState>, Path(_course_id): Path<Uuid>) -> Json<FileList> {
    let state = state.lock();
    let files: Vec<String> = state.results.iter().map(|(name, _)| name.clone()).collect();
    Json(FileList {
        count: files.len(),
        files,
    })
}

/// GET /storage/courses/{id}/results/{*name}
pub async fn download_result(
    State(state): State<SharedState>,
    Path((_course_id, name)): Path<(Uuid, String)>,
) -> ApiResult<Vec<u8>> {
    let state = state.lock();
    state
        .results
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, content)| content.clone())
        .ok_or_else(|| ApiError::NotFound(format!("Result {} not found", name)))
}

#[derive(Debug, Deserialize)]
pub struct ArchiveQuery {
    pub format: Option<String>,
    pub compress: Option<String>,
}

/// GET /storage/courses/{id}/archive
/// Serve the configured archive and record the query it was asked with
pub async fn download_archive(
    State(state): State<SharedState>,
    Path(course_id): Path<Uuid>,
    Query(query): Query<ArchiveQuery>,
) -> ApiResult<Response> {
    let mut state = state.lock();
    state.archive_requests.push(ArchiveRequest {
        course_id,
        format: query.format,
        compress: query.compress,
    });

    let archive = state
        .archive
        .clone()
        .ok_or_else(|| ApiError::NotFound(format!("No archive for course {}", course_id)))?;

    Ok(([(header::CONTENT_TYPE, "application/zip")], archive).into_response())
}

/// GET /storage/info
pub async fn storage_info(State(state): State<SharedState>) -> Json<StorageInfo> {
    let state = state.lock();
    let stored = state.uploads.values().flatten();
    let (total_files, total_size) =
        stored.fold((0u64, 0u64), |(n, size), f| (n + 1, size + f.content.len() as u64));

    Json(StorageInfo {
        storage_type: "memory".to_string(),
        base_path: None,
        total_files,
        total_size,
        extra: Default::default(),
    })
}
