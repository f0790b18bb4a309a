//! Storage domain types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Worker acknowledgement of a multipart upload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub count: usize,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub message: String,
}

/// Listing of stored files for a job or course
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// Storage backend usage summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageInfo {
    #[serde(default)]
    pub storage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub total_size: u64,
    /// Backend-specific fields the client does not model
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}
