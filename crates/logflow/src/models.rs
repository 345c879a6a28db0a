//! Incidents produced by the analysis service.

use serde::{Deserialize, Deserializer, Serialize};

/// Description used when the service leaves it empty.
const NO_DESCRIPTION: &str = "No description provided";

/// A cluster of related anomalies, the unit a ticket is filed for.
///
/// Fields are producer-supplied and not validated; missing ones default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Short human-readable title
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    /// Detailed explanation
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    /// Affected service, if known
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub service: Option<String>,
    /// `LOW`, `MEDIUM`, `HIGH` or `CRITICAL`
    #[serde(default, deserialize_with = "lenient_text")]
    pub severity: String,
    /// How many times the pattern appeared
    #[serde(default, deserialize_with = "lenient_count")]
    pub occurrences: u64,
}

impl Incident {
    /// Title for the ticket, falling back to `Incident in <service>`.
    #[must_use]
    pub fn ticket_title(&self) -> String {
        let title = self.title.trim();
        if title.is_empty() {
            format!(
                "Incident in {}",
                self.service.as_deref().unwrap_or(crate::logs::UNKNOWN_SERVICE)
            )
        } else {
            title.to_string()
        }
    }

    /// Description for the ticket, never empty.
    #[must_use]
    pub fn ticket_description(&self) -> String {
        if self.description.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            self.description.clone()
        }
    }

    /// Service label, if one is set and non-blank.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.service
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Render any JSON value as text; `null` is absent.
fn value_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Accept any JSON value as text; `null` becomes empty.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(serde_json::Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(serde_json::Value::deserialize(deserializer)?))
}

/// Accept a number, a numeric string, or anything else as zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
