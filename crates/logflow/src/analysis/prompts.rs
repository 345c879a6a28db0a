//! Prompt template for incident clustering.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::logs::LogRecord;

/// Template name for the incident prompt.
const INCIDENTS: &str = "incidents";

/// Manages the Handlebars prompt templates.
pub struct PromptManager {
    handlebars: Handlebars<'static>,
}

#[derive(Serialize)]
struct IncidentPromptData<'a> {
    logs: &'a str,
}

impl PromptManager {
    /// Create a prompt manager with the embedded templates.
    pub fn new() -> Result<Self, AnalysisError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(INCIDENTS, INCIDENTS_TEMPLATE)
            .map_err(|e| AnalysisError::Prompt(e.to_string()))?;

        Ok(Self { handlebars })
    }

    /// Render the incident prompt for at most `limit` records.
    pub fn incident_prompt(
        &self,
        records: &[LogRecord],
        limit: usize,
    ) -> Result<String, AnalysisError> {
        let logs = render_records(records, limit);
        self.handlebars
            .render(INCIDENTS, &IncidentPromptData { logs: &logs })
            .map_err(|e| AnalysisError::Prompt(e.to_string()))
    }
}

/// Serialize the first `limit` records as `timestamp | level | service | message`.
#[must_use]
pub fn render_records(records: &[LogRecord], limit: usize) -> String {
    records
        .iter()
        .take(limit)
        .map(|r| {
            format!(
                "{} | {} | {} | {}",
                r.timestamp_display(),
                r.level,
                r.service,
                r.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Incident clustering prompt.
const INCIDENTS_TEMPLATE: &str = r#"You are an observability assistant. Analyze the following logs and return a strict JSON array of incidents.

Each incident MUST be an object with exactly these keys:
- "title": short human-readable title
- "description": detailed explanation
- "service": service/component name (string)
- "severity": one of ["LOW", "MEDIUM", "HIGH", "CRITICAL"]
- "occurrences": integer count of how many times this pattern appears

Group repeated error patterns into single incidents. If no incidents are found, return an empty array [].

Logs:
{{logs}}

Return ONLY the JSON array. Do not include any extra text or explanation."#;
