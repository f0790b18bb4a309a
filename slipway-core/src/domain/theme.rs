//! Theme domain types

use serde::{Deserialize, Serialize};

/// Theme known to the worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub installed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_package: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeList {
    #[serde(default)]
    pub themes: Vec<Theme>,
    #[serde(default)]
    pub count: usize,
}

/// Outcome of installing a single theme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeInstallResult {
    pub theme: String,
    pub success: bool,
    #[serde(default)]
    pub installed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Themes referenced by a job's sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeDetection {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub installed: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

/// Combined detection and installation report for a job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeAutoInstall {
    #[serde(default)]
    pub results: Vec<ThemeInstallResult>,
    #[serde(default)]
    pub successful: usize,
    #[serde(default)]
    pub failed: usize,
}

impl ThemeAutoInstall {
    /// Results whose installation did not succeed
    pub fn failures(&self) -> impl Iterator<Item = &ThemeInstallResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Recompute the counters from the per-theme results
    pub fn tally(&self) -> (usize, usize) {
        let failed = self.failures().count();
        (self.results.len() - failed, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_install_tally_ignores_reported_counters() {
        let report: ThemeAutoInstall = serde_json::from_value(serde_json::json!({
            "results": [
                {"theme": "seriph", "success": true},
                {"theme": "apple-basic", "success": false, "error": "npm exited with 1"}
            ],
            "successful": 0,
            "failed": 0
        }))
        .unwrap();

        assert_eq!(report.tally(), (1, 1));
        let failed: Vec<_> = report.failures().map(|r| r.theme.as_str()).collect();
        assert_eq!(failed, vec!["apple-basic"]);
    }
}
