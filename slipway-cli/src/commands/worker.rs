//! Worker command handlers
//!
//! Health, pool statistics and workspace housekeeping.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use slipway_client::WorkerClient;
use slipway_core::domain::worker::{Workspace, WorkspaceCleanup};
use slipway_core::dto::worker::ListWorkspacesQuery;

use super::{colorize_health, format_size};
use crate::config::Config;
use crate::id_resolver::resolve_workspace_id;

/// Worker subcommands
#[derive(Subcommand)]
pub enum WorkerCommands {
    /// Worker pool health
    Health,
    /// Worker pool statistics
    Stats,
    /// List job workspaces
    Workspaces {
        /// Only workspaces in this state
        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one workspace
    Workspace {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Delete one workspace
    DeleteWorkspace {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Remove workspaces older than the given age
    Cleanup {
        #[arg(long)]
        max_age_hours: Option<u32>,
    },
}

pub async fn handle_worker_command(command: WorkerCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        WorkerCommands::Health => worker_health(&client).await,
        WorkerCommands::Stats => worker_stats(&client).await,
        WorkerCommands::Workspaces {
            status,
            limit,
            offset,
        } => {
            let query = ListWorkspacesQuery {
                status,
                limit: Some(limit),
                offset: Some(offset),
            };
            list_workspaces(&client, &query).await
        }
        WorkerCommands::Workspace { id } => show_workspace(&client, &id).await,
        WorkerCommands::DeleteWorkspace { id } => delete_workspace(&client, &id).await,
        WorkerCommands::Cleanup { max_age_hours } => cleanup(&client, max_age_hours).await,
    }
}

/// Service health; a degraded or unhealthy worker still answers
pub async fn show_health(config: &Config) -> Result<()> {
    let client = config.client()?;
    let report = client
        .health()
        .await
        .with_context(|| format!("Worker at {} is not reachable", config.api_url))?;

    println!("{}", "Worker Health:".bold());
    println!("  Service:  {}", report.service);
    if !report.version.is_empty() {
        println!("  Version:  {}", report.version.dimmed());
    }
    println!("  Status:   {}", colorize_health(report.status));
    for (name, check) in &report.checks {
        println!("  {} {}: {}", "▸".cyan(), name, check);
    }

    Ok(())
}

async fn worker_health(client: &WorkerClient) -> Result<()> {
    let health = client.worker_health().await?;
    let pool = &health.worker_pool;

    println!("{}", "Worker Pool:".bold());
    println!("  Status:   {}", colorize_health(health.status));
    println!("  Workers:  {}/{} active", pool.active_workers, pool.worker_count);
    println!("  Queue:    {}", pool.queue_size);

    Ok(())
}

async fn worker_stats(client: &WorkerClient) -> Result<()> {
    let stats = client.worker_stats().await?;
    let pool = &stats.worker_pool;

    println!("{}", "Worker Statistics:".bold());
    println!("  Workers:  {}/{} active", pool.active_workers, pool.worker_count);
    println!("  Queue:    {}", pool.queue_size);
    for (key, value) in &stats.extra {
        println!("  {}: {}", key.dimmed(), value);
    }

    Ok(())
}

async fn list_workspaces(client: &WorkerClient, query: &ListWorkspacesQuery) -> Result<()> {
    let page = client
        .list_workspaces(query)
        .await
        .context("Failed to list workspaces")?;

    if page.workspaces.is_empty() {
        println!("{}", "No workspaces found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Showing {} of {} workspace(s):",
            page.workspaces.len(),
            page.total_count
        )
        .bold()
    );
    println!();
    for workspace in &page.workspaces {
        print_workspace(workspace);
    }

    Ok(())
}

async fn show_workspace(client: &WorkerClient, id: &str) -> Result<()> {
    let job_id = resolve_workspace_id(client, id).await?;
    let details = client.get_workspace(job_id).await?;

    print_workspace(&details.workspace);
    println!("    Disk:     {}", format_size(details.usage.disk_bytes));
    for (key, value) in &details.activity {
        println!("    {}: {}", key.dimmed(), value);
    }

    Ok(())
}

async fn delete_workspace(client: &WorkerClient, id: &str) -> Result<()> {
    let job_id = resolve_workspace_id(client, id).await?;
    let cleanup = client.delete_workspace(job_id).await?;

    print_cleanup(&cleanup);

    Ok(())
}

async fn cleanup(client: &WorkerClient, max_age_hours: Option<u32>) -> Result<()> {
    let batch = client.cleanup_workspaces(max_age_hours).await?;

    println!(
        "{}",
        format!(
            "Cleaned {} workspace(s), freed {}",
            batch.cleaned_count,
            format_size(batch.total_size_freed)
        )
        .bold()
    );
    for cleanup in &batch.workspaces {
        print_cleanup(cleanup);
    }

    Ok(())
}

fn print_workspace(workspace: &Workspace) {
    println!("  {} Workspace {}", "▸".cyan(), workspace.job_id.to_string().dimmed());
    println!("    Status:   {}", workspace.status);
    println!(
        "    Size:     {} in {} file(s)",
        format_size(workspace.size_bytes),
        workspace.file_count
    );
    if let Some(created) = workspace.created_at {
        println!(
            "    Created:  {}",
            created.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    if let Some(active) = workspace.last_activity {
        println!(
            "    Active:   {}",
            active.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!();
}

fn print_cleanup(cleanup: &WorkspaceCleanup) {
    if cleanup.cleaned {
        println!(
            "  {} {} ({} freed)",
            "✓".green(),
            cleanup.job_id,
            format_size(cleanup.size_freed)
        );
    } else {
        println!("  {} {} not cleaned", "✗".red(), cleanup.job_id);
    }
}
