//! Log incident pipeline.
//!
//! This crate provides:
//! - Structured log parsing with a lossless fallback for unrecognised lines
//! - LLM-based clustering of log records into incidents (Google Gemini)
//! - Strict JSON recovery from free-text model output
//! - Jira Cloud ticket filing with bounded retry and backoff
//! - A pipeline runner that always produces a [`RunSummary`]
//!
//! # Example
//!
//! ```no_run
//! use logflow::{Config, PipelineRunner};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env();
//! let runner = PipelineRunner::from_config(&config)?;
//!
//! let summary = runner.run().await;
//! println!("{}", serde_json::to_string_pretty(&summary.counts())?);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod jira;
pub mod logs;
pub mod models;
pub mod pipeline;
pub mod retry;

pub use analysis::{CompletionProvider, GeminiProvider, IncidentExtractor};
pub use config::Config;
pub use error::{AnalysisError, JiraError};
pub use jira::{JiraClient, TicketFiler, TicketResult};
pub use logs::{LogLevel, LogRecord, LogScanner};
pub use models::Incident;
pub use pipeline::{PipelineRunner, RunCounts, RunSummary, Stage, StageError};
pub use retry::RetryPolicy;
