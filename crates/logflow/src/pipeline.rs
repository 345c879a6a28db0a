//! Pipeline runner - sequences ingest, analyze and ticket stages.
//!
//! No stage failure escapes [`PipelineRunner::run`]: each one becomes a
//! [`StageError`] in the returned [`RunSummary`] and the run carries on with
//! whatever the previous stage produced.

use std::any::Any;
use std::fs;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::analysis::IncidentExtractor;
use crate::config::{Config, PipelineConfig};
use crate::jira::{TicketFiler, TicketResult};
use crate::logs::{LogRecord, LogScanner};
use crate::models::Incident;

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ingest,
    Analyze,
    Ticket,
    Pipeline,
}

/// A recoverable failure recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageError {
    /// Stage the failure happened in
    pub stage: Stage,
    /// Human-readable error message
    pub message: String,
    /// Title of the incident being filed, for ticket errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident: Option<String>,
    /// Error chain or panic details
    #[serde(default)]
    pub trace: Option<String>,
}

impl StageError {
    /// Stage error without a trace.
    #[must_use]
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            incident: None,
            trace: None,
        }
    }

    /// Stage error carrying the full error chain as its trace.
    #[must_use]
    pub fn from_error(stage: Stage, err: &anyhow::Error) -> Self {
        Self {
            stage,
            message: format!("{err:#}"),
            incident: None,
            trace: Some(format!("{err:?}")),
        }
    }

    /// Attach the incident this error belongs to.
    #[must_use]
    pub fn for_incident(mut self, title: impl Into<String>) -> Self {
        self.incident = Some(title.into());
        self
    }
}

/// Counts printed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub logs_scanned: usize,
    pub incidents_detected: usize,
    pub jira_tickets_created: usize,
}

/// Everything a run produced. Always returned, even when every stage fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Records read from log files
    pub logs_scanned: usize,
    /// Incidents returned by analysis
    pub incidents_detected: usize,
    /// Tickets that produced a browse URL
    pub jira_tickets_created: usize,
    /// Incidents returned by analysis
    pub incidents: Vec<Incident>,
    /// Successfully created tickets
    pub tickets: Vec<TicketResult>,
    /// Stage errors in the order they happened
    pub errors: Vec<StageError>,
}

impl RunSummary {
    /// Just the counts.
    #[must_use]
    pub fn counts(&self) -> RunCounts {
        RunCounts {
            logs_scanned: self.logs_scanned,
            incidents_detected: self.incidents_detected,
            jira_tickets_created: self.jira_tickets_created,
        }
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run summary")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write run summary to {}", path.display()))
    }
}

/// Runs the three pipeline stages in order.
pub struct PipelineRunner {
    log_dir: PathBuf,
    extractor: IncidentExtractor,
    filer: TicketFiler,
    config: PipelineConfig,
    project_override: Option<String>,
}

impl PipelineRunner {
    /// Create a runner from already-built components.
    #[must_use]
    pub fn new(
        log_dir: impl Into<PathBuf>,
        extractor: IncidentExtractor,
        filer: TicketFiler,
        config: PipelineConfig,
    ) -> Self {
        Self {
            log_dir: log_dir.into(),
            extractor,
            filer,
            config,
            project_override: None,
        }
    }

    /// Create a runner backed by Gemini and Jira.
    pub fn from_config(config: &Config) -> Result<Self> {
        let extractor = IncidentExtractor::from_config(&config.analysis, config.retry)
            .context("Failed to build incident extractor")?;
        let filer = TicketFiler::from_config(&config.jira, config.retry)
            .context("Failed to build Jira ticket filer")?;

        Ok(Self::new(
            config.logs.dir.clone(),
            extractor,
            filer,
            config.pipeline.clone(),
        ))
    }

    /// Scan `dir` instead of the configured directory.
    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// File tickets in `project` instead of the configured default.
    #[must_use]
    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project_override = project;
        self
    }

    /// Directory the ingest stage reads.
    #[must_use]
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Run the pipeline. Never fails; problems are recorded in the summary.
    pub async fn run(&self) -> RunSummary {
        info!(dir = %self.log_dir.display(), "Starting pipeline run");
        let mut summary = RunSummary::default();

        let outcome = AssertUnwindSafe(self.run_stages(&mut summary))
            .catch_unwind()
            .await;

        if let Err(panic) = outcome {
            let message = panic_message(panic.as_ref());
            error!(panic = %message, "Pipeline panicked");
            let mut err = StageError::new(Stage::Pipeline, format!("pipeline panicked: {message}"));
            err.trace = Some(message);
            summary.errors.push(err);
        }

        info!(
            logs_scanned = summary.logs_scanned,
            incidents_detected = summary.incidents_detected,
            jira_tickets_created = summary.jira_tickets_created,
            errors = summary.errors.len(),
            "Pipeline finished"
        );

        summary
    }

    async fn run_stages(&self, summary: &mut RunSummary) {
        let records = self.ingest(summary).await;
        summary.logs_scanned = records.len();

        let incidents = self.analyze(&records, summary).await;
        summary.incidents_detected = incidents.len();
        summary.incidents = incidents;

        let incidents = summary.incidents.clone();
        self.file_tickets(&incidents, summary).await;
    }

    async fn ingest(&self, summary: &mut RunSummary) -> Vec<LogRecord> {
        let scanner = LogScanner::new(self.log_dir.clone());

        match tokio::task::spawn_blocking(move || scanner.scan()).await {
            Ok(records) => {
                info!(records = records.len(), "Ingested log records");
                records
            }
            Err(e) => {
                let err = anyhow::Error::new(e).context("Log ingestion failed");
                error!(error = %err, "Error ingesting logs");
                summary.errors.push(StageError::from_error(Stage::Ingest, &err));
                Vec::new()
            }
        }
    }

    async fn analyze(&self, records: &[LogRecord], summary: &mut RunSummary) -> Vec<Incident> {
        if records.is_empty() {
            info!("No log records, skipping analysis");
            return Vec::new();
        }

        match self.extractor.analyze(records).await {
            Ok(incidents) => {
                info!(incidents = incidents.len(), "Detected incidents");
                incidents
            }
            Err(e) => {
                let err = anyhow::Error::new(e).context("Incident analysis failed");
                error!(error = %err, "Error analyzing logs");
                summary.errors.push(StageError::from_error(Stage::Analyze, &err));
                Vec::new()
            }
        }
    }

    async fn file_tickets(&self, incidents: &[Incident], summary: &mut RunSummary) {
        if incidents.is_empty() {
            return;
        }

        let results = self
            .filer
            .file_all(
                incidents,
                self.project_override.as_deref(),
                self.config.ticket_concurrency,
            )
            .await;

        for (incident, result) in incidents.iter().zip(results) {
            let title = incident.ticket_title();
            match result {
                Ok(ticket) if ticket.is_created() => {
                    info!(title = %title, url = %ticket.url, "Created Jira ticket for incident");
                    summary.jira_tickets_created += 1;
                    summary.tickets.push(ticket);
                }
                Ok(_) => {
                    warn!(title = %title, "Jira ticket created without a key");
                }
                Err(e) => {
                    let err = anyhow::Error::new(e).context("Ticket creation failed");
                    error!(title = %title, error = %err, "Error creating ticket for incident");
                    summary
                        .errors
                        .push(StageError::from_error(Stage::Ticket, &err).for_incident(title));
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
