//! Theme DTOs

use serde::{Deserialize, Serialize};

/// Request to install a theme on the worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallTheme {
    pub theme: String,
}
