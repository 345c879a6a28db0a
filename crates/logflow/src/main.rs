//! Logflow CLI
//!
//! Scans log files, asks Gemini to cluster anomalies into incidents, and
//! files a Jira ticket per incident. Prints a counts-only JSON summary to
//! stdout and writes the full run summary to a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use logflow::logs::{render_listing, LogScanner};
use logflow::{Config, PipelineRunner, RunSummary, Stage, StageError};

/// Log incident pipeline - scans logs, detects incidents, files Jira tickets
#[derive(Parser)]
#[command(name = "logflow")]
#[command(about = "Log incident pipeline - scans logs, detects incidents, files Jira tickets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full ingest, analyze and ticket pipeline (default)
    Run {
        /// Log directory (defaults to LOG_DIR, then ./logs)
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Where to write the detailed run summary
        #[arg(long)]
        output: Option<PathBuf>,

        /// Jira project key overriding JIRA_PROJECT_KEY
        #[arg(long)]
        project: Option<String>,
    },

    /// Parse log files and print the records without analysis
    Scan {
        /// Log directory (defaults to LOG_DIR, then ./logs)
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("logflow=debug,info")
        } else {
            EnvFilter::new("logflow=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = Config::from_env();

    match cli.command.unwrap_or(Commands::Run {
        log_dir: None,
        output: None,
        project: None,
    }) {
        Commands::Run {
            log_dir,
            output,
            project,
        } => run_pipeline(&config, log_dir, output, project).await,
        Commands::Scan { log_dir } => run_scan(&config, log_dir).await,
    }
}

async fn run_pipeline(
    config: &Config,
    log_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    project: Option<String>,
) -> Result<()> {
    let summary = match PipelineRunner::from_config(config) {
        Ok(runner) => {
            let runner = runner
                .with_log_dir(config.logs.resolve(log_dir))
                .with_project(project);
            tracing::info!(dir = %runner.log_dir().display(), "Starting logflow pipeline");
            runner.run().await
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Failed to set up pipeline");
            RunSummary {
                errors: vec![StageError::from_error(Stage::Pipeline, &e)],
                ..RunSummary::default()
            }
        }
    };

    let counts = summary.counts();
    println!(
        "{}",
        serde_json::to_string_pretty(&counts).context("Failed to serialize counts")?
    );
    tracing::info!(?counts, "Pipeline finished");

    let output = output.unwrap_or_else(|| config.pipeline.output_path.clone());
    match summary.write_json(&output) {
        Ok(()) => tracing::info!(path = %output.display(), "Detailed pipeline result written"),
        Err(e) => tracing::error!(error = %format!("{e:#}"), "Failed to write detailed pipeline result"),
    }

    Ok(())
}

async fn run_scan(config: &Config, log_dir: Option<PathBuf>) -> Result<()> {
    let dir = config.logs.resolve(log_dir);
    let scanner = LogScanner::new(dir.clone());
    let records = tokio::task::spawn_blocking(move || scanner.scan())
        .await
        .context("Log scan task failed")?;

    println!("{}", render_listing(&dir, &records));
    Ok(())
}
