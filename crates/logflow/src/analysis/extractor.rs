//! Incident extraction: records in, incidents out.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::logs::LogRecord;
use crate::models::Incident;
use crate::retry::RetryPolicy;

use super::extract::extract_incidents;
use super::gemini::GeminiProvider;
use super::prompts::PromptManager;
use super::provider::CompletionProvider;

/// Asks a completion provider to cluster log records into incidents.
pub struct IncidentExtractor {
    provider: Arc<dyn CompletionProvider>,
    prompts: PromptManager,
    max_records: usize,
    retry: RetryPolicy,
}

impl IncidentExtractor {
    /// Create an extractor around an existing provider.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        max_records: usize,
        retry: RetryPolicy,
    ) -> Result<Self, AnalysisError> {
        Ok(Self {
            provider,
            prompts: PromptManager::new()?,
            max_records,
            retry,
        })
    }

    /// Create an extractor backed by Gemini.
    pub fn from_config(config: &AnalysisConfig, retry: RetryPolicy) -> Result<Self, AnalysisError> {
        let provider = GeminiProvider::new(config.clone())?;
        Self::new(Arc::new(provider), config.max_records, retry)
    }

    /// Cluster `records` into incidents, reporting why analysis failed.
    ///
    /// Without a credential this returns [`AnalysisError::NotConfigured`]
    /// before any network call.
    pub async fn analyze(&self, records: &[LogRecord]) -> Result<Vec<Incident>, AnalysisError> {
        if !self.provider.is_configured() {
            return Err(AnalysisError::NotConfigured(format!(
                "{} credential not set; skipping analysis",
                self.provider.name()
            )));
        }

        let prompt = self.prompts.incident_prompt(records, self.max_records)?;
        info!(
            provider = self.provider.name(),
            records = records.len().min(self.max_records),
            "Requesting incident analysis"
        );

        let provider = self.provider.as_ref();
        let prompt = prompt.as_str();
        let text = self
            .retry
            .run("analysis", move |_| provider.complete(prompt))
            .await?;

        let incidents = extract_incidents(&text)?;
        info!(incidents = incidents.len(), "Analysis complete");
        Ok(incidents)
    }

    /// Cluster `records` into incidents; any failure yields an empty list.
    pub async fn extract(&self, records: &[LogRecord]) -> Vec<Incident> {
        match self.analyze(records).await {
            Ok(incidents) => incidents,
            Err(e) => {
                warn!(error = %e, "Incident analysis failed, continuing with no incidents");
                Vec::new()
            }
        }
    }
}
