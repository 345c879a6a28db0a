//! Structured log records.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Service name used when a line carries none.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Marker rendered in place of a missing timestamp.
pub const NO_TIMESTAMP: &str = "NO_TIMESTAMP";

/// Severity token of a log line.
///
/// `WARN` and `WARNING` are kept apart so the token as written survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Warning,
    Error,
    /// Line did not match the structured format
    Unknown,
}

impl LogLevel {
    /// Parse an exact, case-sensitive level token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARN" => Some(Self::Warn),
            "WARNING" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }

    /// The token as it appears in log files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One non-blank line of a log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Parsed timestamp, absent when missing or unparseable
    pub timestamp: Option<DateTime<Utc>>,
    /// Severity token
    pub level: LogLevel,
    /// Emitting service
    pub service: String,
    /// Message text after the bracket prefixes
    pub message: String,
    /// The trimmed source line
    pub raw: String,
}

impl LogRecord {
    /// Record for a line that did not match the structured format.
    #[must_use]
    pub fn unstructured(line: &str) -> Self {
        Self {
            timestamp: None,
            level: LogLevel::Unknown,
            service: UNKNOWN_SERVICE.to_string(),
            message: line.to_string(),
            raw: line.to_string(),
        }
    }

    /// ISO-8601 timestamp or the [`NO_TIMESTAMP`] marker.
    #[must_use]
    pub fn timestamp_display(&self) -> String {
        self.timestamp.map_or_else(
            || NO_TIMESTAMP.to_string(),
            |ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )
    }
}
