//! Worker DTOs

use serde::{Deserialize, Serialize};

/// Filters for listing workspaces, sent as a query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListWorkspacesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Age threshold for batch workspace cleanup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_hours: Option<u32>,
}
