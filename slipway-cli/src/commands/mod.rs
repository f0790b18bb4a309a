//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod generate;
mod job;
mod storage;
mod theme;
mod worker;

pub use generate::GenerateArgs;
pub use job::JobCommands;
pub use storage::StorageCommands;
pub use theme::ThemeCommands;
pub use worker::WorkerCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::{ColoredString, Colorize};
use slipway_core::domain::health::HealthStatus;
use slipway_core::domain::job::JobStatus;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a presentation from a GitHub repository
    Generate(GenerateArgs),
    /// Check worker health
    Health,
    /// Job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Theme management
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Uploaded sources and generated results
    Storage {
        #[command(subcommand)]
        command: StorageCommands,
    },
    /// Worker pool and workspaces
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },
}

/// Route a command to its handler
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate(args) => generate::handle_generate(args, config).await,
        Commands::Health => worker::show_health(config).await,
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Theme { command } => theme::handle_theme_command(command, config).await,
        Commands::Storage { command } => storage::handle_storage_command(command, config).await,
        Commands::Worker { command } => worker::handle_worker_command(command, config).await,
    }
}

/// Colorize job status for display
pub(crate) fn colorize_status(status: JobStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        JobStatus::Pending => label.yellow(),
        JobStatus::Processing => label.cyan(),
        JobStatus::Completed => label.green(),
        JobStatus::Failed => label.red(),
        JobStatus::Timeout => label.red(),
    }
}

pub(crate) fn colorize_health(status: HealthStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        HealthStatus::Healthy => label.green(),
        HealthStatus::Degraded => label.yellow(),
        HealthStatus::Unhealthy => label.red(),
        HealthStatus::Unknown => label.dimmed(),
    }
}

/// Human readable byte count
pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
