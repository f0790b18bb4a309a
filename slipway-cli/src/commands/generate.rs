//! Generate command
//!
//! Runs the full pipeline and reports where the presentation landed.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use slipway_generator::{GenerateError, GeneratorConfig, Generator, UploadMode, WaitSpec};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;

/// Overall budget for one generation, on top of the wait timeout
const RUN_DEADLINE: Duration = Duration::from_secs(30 * 60);

#[derive(Args)]
pub struct GenerateArgs {
    /// GitHub repository URL, optionally with /tree/<branch>/<path>
    url: String,

    /// Directory receiving presentation.zip and the extracted presentation
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Only use sources under this folder
    #[arg(short, long)]
    subfolder: Option<String>,

    /// Entry file rendered by the worker
    #[arg(long, default_value = "slides.md")]
    source_path: String,

    /// Seconds to wait for the job to finish
    #[arg(long, default_value_t = 900, value_parser = clap::value_parser!(u64).range(1..))]
    wait_timeout: u64,

    /// Seconds between status checks
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    wait_interval: u64,

    /// Stream files from disk instead of loading them into memory
    #[arg(long)]
    streaming: bool,

    /// Host serving repository archives
    #[arg(long, default_value = GeneratorConfig::DEFAULT_ARCHIVE_BASE)]
    archive_base: String,
}

impl GenerateArgs {
    fn into_config(self, config: &Config) -> GeneratorConfig {
        let mut generator = GeneratorConfig::new(self.url, &config.api_url)
            .with_output_dir(self.output)
            .with_archive_base(self.archive_base)
            .with_wait(WaitSpec::new(
                Duration::from_secs(self.wait_interval),
                Duration::from_secs(self.wait_timeout),
            ))
            .with_upload_mode(if self.streaming {
                UploadMode::Streaming
            } else {
                UploadMode::InMemory
            });
        generator.client = config.client_config();
        generator.source_path = self.source_path;
        if let Some(subfolder) = self.subfolder {
            generator = generator.with_subfolder(subfolder);
        }
        generator
    }
}

pub async fn handle_generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let generator = Generator::new(args.into_config(config)).context("Invalid generation settings")?;

    println!("{} {}", "Generating".bold(), generator.source().to_string().cyan());

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_interrupt(cancel.clone()));
    let outcome = generator.generate(&cancel).await;
    watcher.abort();

    match outcome {
        Ok(result) => {
            println!("{}", "✓ Presentation generated".green().bold());
            println!("  Job ID:      {}", result.job_id.to_string().cyan());
            println!("  Course ID:   {}", result.course_id.to_string().dimmed());
            println!("  Archive:     {}", result.archive.archive_path.display());
            println!("  Files:       {}", result.archive.files.len());
            match &result.archive.entry_point {
                Some(entry) => println!("  Entry point: {}", entry.display().to_string().green()),
                None => println!("  Entry point: {}", "no index.html in archive".yellow()),
            }
            Ok(())
        }
        Err(e) if e.is_cancelled() => bail!("Generation interrupted: {}", e),
        Err(GenerateError::Health(e)) => {
            Err(e).with_context(|| format!("Worker at {} is not reachable", config.api_url))
        }
        Err(e) => Err(e.into()),
    }
}

/// Cancel on Ctrl-C or once the overall deadline passes
async fn cancel_on_interrupt(cancel: CancellationToken) {
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupted => warn!("Interrupted, cancelling generation"),
        _ = tokio::time::sleep(RUN_DEADLINE) => {
            warn!(deadline = ?RUN_DEADLINE, "Generation deadline reached, cancelling");
        }
    }
    cancel.cancel();
}
