//! Theme command handlers

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::Colorize;
use slipway_client::WorkerClient;
use slipway_core::domain::theme::{ThemeAutoInstall, ThemeInstallResult};

use crate::config::Config;
use crate::id_resolver::resolve_job_id;

/// Theme subcommands
#[derive(Subcommand)]
pub enum ThemeCommands {
    /// List themes the worker knows about
    List,
    /// Install a theme on the worker
    Install {
        /// Theme name, e.g. seriph
        name: String,
    },
    /// Show the themes a job's sources require
    Detect {
        /// Job ID or unambiguous prefix
        job: String,
    },
    /// Install every theme a job's sources require
    AutoInstall {
        /// Job ID or unambiguous prefix
        job: String,
    },
}

pub async fn handle_theme_command(command: ThemeCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        ThemeCommands::List => list_themes(&client).await,
        ThemeCommands::Install { name } => install_theme(&client, &name).await,
        ThemeCommands::Detect { job } => detect_themes(&client, &job).await,
        ThemeCommands::AutoInstall { job } => auto_install(&client, &job).await,
    }
}

async fn list_themes(client: &WorkerClient) -> Result<()> {
    let list = client
        .list_available_themes()
        .await
        .context("Failed to list themes")?;

    if list.themes.is_empty() {
        println!("{}", "No themes available.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} theme(s):", list.themes.len()).bold());
    println!();
    for theme in &list.themes {
        let marker = if theme.installed {
            "✓".green()
        } else {
            "·".dimmed()
        };
        println!("  {} {} {}", marker, theme.name.cyan(), theme.version.dimmed());
        if !theme.description.is_empty() {
            println!("      {}", theme.description);
        }
    }

    Ok(())
}

async fn install_theme(client: &WorkerClient, name: &str) -> Result<()> {
    let result = client
        .install_theme(name)
        .await
        .with_context(|| format!("Failed to install theme '{}'", name))?;

    print_install_result(&result);
    if !result.success {
        bail!("Theme '{}' was not installed", name);
    }

    Ok(())
}

async fn detect_themes(client: &WorkerClient, job: &str) -> Result<()> {
    let job_id = resolve_job_id(client, job).await?;
    let detection = client.detect_themes(job_id).await?;

    println!("{}", format!("Themes for job {}:", job_id).bold());
    println!("  Required:  {}", join_or_none(&detection.required));
    println!("  Installed: {}", join_or_none(&detection.installed).green());
    if detection.missing.is_empty() {
        println!("  Missing:   {}", "none".dimmed());
    } else {
        println!("  Missing:   {}", detection.missing.join(", ").red());
    }

    Ok(())
}

async fn auto_install(client: &WorkerClient, job: &str) -> Result<()> {
    let job_id = resolve_job_id(client, job).await?;
    let report = client.auto_install_themes(job_id).await?;

    print_auto_install(&report);

    Ok(())
}

fn print_install_result(result: &ThemeInstallResult) {
    if result.success {
        println!("  {} {}", "✓".green(), result.theme);
    } else {
        let reason = result.error.as_deref().unwrap_or("unknown error");
        println!("  {} {}: {}", "✗".red(), result.theme, reason.red());
    }
}

fn print_auto_install(report: &ThemeAutoInstall) {
    let (successful, failed) = report.tally();
    if report.results.is_empty() {
        println!("{}", "No themes required.".dimmed());
        return;
    }

    println!(
        "{}",
        format!("Installed {} theme(s), {} failed:", successful, failed).bold()
    );
    for result in &report.results {
        print_install_result(result);
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
