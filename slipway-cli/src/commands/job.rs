//! Job command handlers
//!
//! Listing, inspecting and waiting on generation jobs, and reading their logs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use slipway_client::WorkerClient;
use slipway_core::domain::job::{Job, JobStatus};
use slipway_core::dto::job::ListJobsQuery;
use slipway_generator::{JobPoller, WaitSpec};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::colorize_status;
use crate::config::Config;
use crate::id_resolver::resolve_job_id;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List jobs
    List {
        /// Only jobs in this status
        #[arg(long)]
        status: Option<JobStatus>,

        /// Only jobs for this course
        #[arg(long)]
        course: Option<Uuid>,

        #[arg(long, default_value_t = 20)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Get job details
    Get {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Wait for a job to finish
    Wait {
        /// Job ID or unambiguous prefix
        id: String,

        /// Seconds to wait before giving up
        #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,

        /// Seconds between status checks
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
    /// Get job logs
    Logs {
        /// Job ID or unambiguous prefix
        id: String,
    },
}

pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        JobCommands::List {
            status,
            course,
            limit,
            offset,
        } => {
            let query = ListJobsQuery {
                status,
                course_id: course,
                limit: Some(limit),
                offset: Some(offset),
            };
            list_jobs(&client, &query).await
        }
        JobCommands::Get { id } => get_job(&client, &id).await,
        JobCommands::Wait {
            id,
            timeout,
            interval,
        } => {
            let wait = WaitSpec::new(Duration::from_secs(interval), Duration::from_secs(timeout));
            wait_for_job(client, &id, wait).await
        }
        JobCommands::Logs { id } => get_job_logs(&client, &id).await,
    }
}

async fn list_jobs(client: &WorkerClient, query: &ListJobsQuery) -> Result<()> {
    let list = client.list_jobs(query).await.context("Failed to list jobs")?;

    if list.jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Showing {} of {} job(s):", list.jobs.len(), list.total_count).bold()
    );
    println!();
    for job in &list.jobs {
        print_job_summary(job);
    }

    Ok(())
}

async fn get_job(client: &WorkerClient, id: &str) -> Result<()> {
    let job_id = resolve_job_id(client, id).await?;
    let job = client.get_job(job_id).await?;

    print_job_details(&job);

    Ok(())
}

async fn wait_for_job(client: WorkerClient, id: &str, wait: WaitSpec) -> Result<()> {
    let job_id = resolve_job_id(&client, id).await?;

    println!(
        "Waiting for job {} (checking every {:?}, up to {:?})",
        job_id.to_string().cyan(),
        wait.interval,
        wait.timeout
    );

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let poller = JobPoller::new(Arc::new(client));
    let outcome = poller.wait_for_completion(job_id, &wait, &cancel).await;
    interrupt.abort();

    let job = outcome?;
    print_job_details(&job);

    Ok(())
}

async fn get_job_logs(client: &WorkerClient, id: &str) -> Result<()> {
    let job_id = resolve_job_id(client, id).await?;
    let logs = client.job_logs(job_id).await?;

    if logs.trim().is_empty() {
        println!("{}", "No logs found for this job.".yellow());
    } else {
        println!("{}", format!("Logs for job {}:", job_id).bold());
        println!("{}", "─".repeat(80).dimmed());
        print!("{}", logs);
        if !logs.ends_with('\n') {
            println!();
        }
        println!("{}", "─".repeat(80).dimmed());
    }

    Ok(())
}

fn print_job_summary(job: &Job) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Course:   {}", job.course_id.to_string().dimmed());
    println!("    Status:   {}", colorize_status(job.status));
    println!(
        "    Created:  {}",
        job.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );
    println!();
}

fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.to_string().cyan());
    println!("  Course ID:   {}", job.course_id.to_string().dimmed());
    println!("  Status:      {}", colorize_status(job.status));
    if let Some(progress) = job.progress {
        println!("  Progress:    {}%", progress);
    }
    println!("  Created:     {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated:     {}", job.updated_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(started) = job.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = job.completed_at {
        println!("  Completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = job.started_at {
            let duration = completed.signed_duration_since(started);
            println!("  Duration:    {}s", duration.num_seconds());
        }
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }

    if !job.logs.is_empty() {
        println!("\n{}", "Recent log:".bold());
        for line in &job.logs {
            println!("  {}", line.dimmed());
        }
    }
}
