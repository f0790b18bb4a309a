//! Configuration module
//!
//! Connection settings shared by every command.

use std::time::Duration;

use anyhow::{Context, Result};
use slipway_client::{ClientConfig, WorkerClient};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the generation worker
    pub api_url: String,
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.api_url).with_timeout(self.timeout);
        match &self.auth_token {
            Some(token) => config.with_auth_token(token),
            None => config,
        }
    }

    /// Build a worker client from these settings
    pub fn client(&self) -> Result<WorkerClient> {
        WorkerClient::from_config(&self.client_config())
            .with_context(|| format!("Failed to create client for {}", self.api_url))
    }
}
