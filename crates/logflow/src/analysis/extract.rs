//! Recovering an incident list from free-form model output.
//!
//! Accepted shapes, in order:
//! 1. the whole text is a JSON array, or an object with an `incidents` array;
//! 2. the span from the first `[` to the last `]` parses as a JSON array.

use serde_json::Value;
use tracing::warn;

use crate::error::AnalysisError;
use crate::models::Incident;

/// Maximum characters of a failed candidate kept in error messages.
const CANDIDATE_PREVIEW: usize = 500;

/// Extract incidents from `text`.
pub fn extract_incidents(text: &str) -> Result<Vec<Incident>, AnalysisError> {
    extract_values(text).map(incidents_from_values)
}

/// Extract the raw incident objects from `text`.
pub fn extract_values(text: &str) -> Result<Vec<Value>, AnalysisError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    if let Ok(parsed) = serde_json::from_str::<Value>(text) {
        match parsed {
            Value::Array(items) => return Ok(items),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.remove("incidents") {
                    return Ok(items);
                }
            }
            _ => {}
        }
    }

    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Err(AnalysisError::Unparseable(
            "no JSON array found in response".to_string(),
        ));
    };
    if end <= start {
        return Err(AnalysisError::Unparseable(
            "no JSON array found in response".to_string(),
        ));
    }

    let candidate = &text[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(AnalysisError::Unparseable(
            "bracketed candidate is not an array".to_string(),
        )),
        Err(e) => Err(AnalysisError::Unparseable(format!(
            "{e}; candidate was: {}",
            preview(candidate)
        ))),
    }
}

/// Decode each object into an [`Incident`], skipping anything that is not one.
#[must_use]
pub fn incidents_from_values(values: Vec<Value>) -> Vec<Incident> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            if !value.is_object() {
                warn!(index, "Skipping incident entry that is not an object");
                return None;
            }
            match serde_json::from_value::<Incident>(value) {
                Ok(incident) => Some(incident),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed incident entry");
                    None
                }
            }
        })
        .collect()
}

fn preview(text: &str) -> String {
    text.chars().take(CANDIDATE_PREVIEW).collect()
}
