//! Slipway CLI
//!
//! Command-line interface for generating presentations on a remote worker and
//! inspecting the worker's jobs, themes, storage and workspaces.

mod commands;
mod config;
mod id_resolver;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "slipway")]
#[command(about = "Presentation generation CLI", long_about = None)]
struct Cli {
    /// Worker API URL
    #[arg(long, global = true, env = "SLIPWAY_API_URL", default_value = "http://localhost:8081")]
    api_url: String,

    /// Bearer token for the worker API
    #[arg(long, global = true, env = "SLIPWAY_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "SLIPWAY_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "slipway=debug,slipway_generator=debug,slipway_client=debug"
    } else {
        "slipway=info,slipway_generator=info,slipway_client=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config {
        api_url: cli.api_url,
        auth_token: cli.token,
        timeout: Duration::from_secs(cli.timeout),
    };

    handle_command(cli.command, &config).await
}
