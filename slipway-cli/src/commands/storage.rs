//! Storage command handlers
//!
//! Inspects uploaded sources and generated results, and downloads them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use slipway_client::WorkerClient;
use slipway_core::domain::storage::FileList;
use uuid::Uuid;

use super::format_size;
use crate::config::Config;
use crate::id_resolver::resolve_job_id;

/// Storage subcommands
#[derive(Subcommand)]
pub enum StorageCommands {
    /// List or download the sources uploaded for a job
    Sources {
        /// Job ID or unambiguous prefix
        job: String,

        /// Download this file instead of listing
        #[arg(long, requires = "dest")]
        file: Option<String>,

        /// Where the downloaded file is written
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// List or download the results generated for a course
    Results {
        course: Uuid,

        /// Download this file instead of listing
        #[arg(long, requires = "dest")]
        file: Option<String>,

        /// Where the downloaded file is written
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Show storage backend information
    Info,
}

pub async fn handle_storage_command(command: StorageCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        StorageCommands::Sources { job, file, dest } => {
            let job_id = resolve_job_id(&client, &job).await?;
            match (file, dest) {
                (Some(name), Some(dest)) => {
                    let download = client.download_source(job_id, &name).await?;
                    report_download(&name, download.save_to(&dest).await?, &dest);
                }
                _ => {
                    let list = client.list_sources(job_id).await?;
                    print_file_list(&format!("Sources for job {}", job_id), &list);
                }
            }
            Ok(())
        }
        StorageCommands::Results { course, file, dest } => {
            match (file, dest) {
                (Some(name), Some(dest)) => {
                    let download = client.download_result(course, &name).await?;
                    report_download(&name, download.save_to(&dest).await?, &dest);
                }
                _ => {
                    let list = client.list_results(course).await?;
                    print_file_list(&format!("Results for course {}", course), &list);
                }
            }
            Ok(())
        }
        StorageCommands::Info => show_info(&client).await,
    }
}

async fn show_info(client: &WorkerClient) -> Result<()> {
    let info = client
        .storage_info()
        .await
        .context("Failed to get storage info")?;

    println!("{}", "Storage:".bold());
    println!("  Type:        {}", info.storage_type.cyan());
    if let Some(base_path) = &info.base_path {
        println!("  Base path:   {}", base_path);
    }
    println!("  Files:       {}", info.total_files);
    println!("  Total size:  {}", format_size(info.total_size));
    for (key, value) in &info.extra {
        println!("  {}: {}", key.dimmed(), value);
    }

    Ok(())
}

fn print_file_list(title: &str, list: &FileList) {
    if list.files.is_empty() {
        println!("{}", format!("{}: no files.", title).yellow());
        return;
    }

    println!("{}", format!("{} ({} file(s)):", title, list.files.len()).bold());
    for name in &list.files {
        println!("  {} {}", "▸".cyan(), name);
    }
}

fn report_download(name: &str, bytes: u64, dest: &std::path::Path) {
    println!(
        "{} {} ({}) -> {}",
        "✓".green(),
        name,
        format_size(bytes),
        dest.display()
    );
}
