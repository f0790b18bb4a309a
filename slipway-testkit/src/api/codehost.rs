//! Code Host Archive Handler
//!
//! Serves branch snapshots the way the public code host does.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::state::SharedState;

/// GET /{owner}/{repo}/archive/refs/heads/{file}
/// `file` is `<branch>.zip`
pub async fn branch_archive(
    State(state): State<SharedState>,
    Path((owner, repo, file)): Path<(String, String, String)>,
) -> Response {
    let Some(branch) = file.strip_suffix(".zip") else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    let key = format!("{}/{}/{}", owner, repo, branch);
    let mut state = state.lock();
    state.repository_downloads += 1;

    match state.repositories.get(&key) {
        Some(bytes) => ([(header::CONTENT_TYPE, "application/zip")], bytes.clone()).into_response(),
        None => {
            tracing::debug!("No repository archive for {}", key);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}
