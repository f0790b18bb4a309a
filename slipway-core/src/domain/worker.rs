//! Worker pool and workspace types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::health::HealthStatus;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerPool {
    #[serde(default)]
    pub active_workers: u32,
    #[serde(default)]
    pub worker_count: u32,
    #[serde(default)]
    pub queue_size: u32,
}

/// Body returned by the worker health endpoint (200 or 503)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerHealth {
    #[serde(default)]
    pub status: HealthStatus,
    #[serde(default)]
    pub worker_pool: WorkerPool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerStats {
    #[serde(default)]
    pub worker_pool: WorkerPool,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Per-job scratch directory on the worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub job_id: Uuid,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspacePage {
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceUsage {
    #[serde(default)]
    pub disk_bytes: u64,
    #[serde(default)]
    pub file_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceDetails {
    pub workspace: Workspace,
    #[serde(default)]
    pub usage: WorkspaceUsage,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub activity: HashMap<String, serde_json::Value>,
}

/// Outcome of removing one workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceCleanup {
    pub job_id: Uuid,
    pub cleaned: bool,
    #[serde(default)]
    pub size_freed: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceCleanupBatch {
    #[serde(default)]
    pub cleaned_count: usize,
    #[serde(default)]
    pub total_size_freed: u64,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceCleanup>,
}
