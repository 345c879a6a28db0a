//! Line-level log parsing.
//!
//! Structured lines look like:
//!
//! ```text
//! [2025-11-26T12:00:01Z] [INFO] [web] Started request id=42
//! ```
//!
//! Anything else is kept as an `UNKNOWN` record so no input line is lost.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use super::record::{LogLevel, LogRecord};

/// `[timestamp] [LEVEL] [service] message`
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<timestamp>[^\]]+)\]\s+\[(?P<level>INFO|WARN|ERROR|WARNING|DEBUG)\]\s+\[(?P<service>[^\]]+)\]\s+(?P<message>.+)",
    )
    .unwrap()
});

/// Naive layouts tried after RFC 3339, most specific first.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Layouts with an explicit offset but a space separator.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Parse a single line. Returns `None` for blank lines.
#[must_use]
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    Some(parse_structured(line).unwrap_or_else(|| LogRecord::unstructured(line)))
}

/// Parse every non-blank line of `text`, preserving order.
#[must_use]
pub fn parse_str(text: &str) -> Vec<LogRecord> {
    text.lines().filter_map(parse_line).collect()
}

/// Parse raw file contents, replacing undecodable bytes.
#[must_use]
pub fn parse_bytes(bytes: &[u8]) -> Vec<LogRecord> {
    parse_str(&String::from_utf8_lossy(bytes))
}

/// Parse an ISO-8601-like timestamp. A trailing `Z` is accepted; naive
/// values are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    let naive = raw.strip_suffix('Z').unwrap_or(raw);

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(ts.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

fn parse_structured(line: &str) -> Option<LogRecord> {
    let caps = LINE_PATTERN.captures(line)?;
    let level = LogLevel::from_token(caps.name("level")?.as_str())?;

    Some(LogRecord {
        timestamp: caps
            .name("timestamp")
            .and_then(|m| parse_timestamp(m.as_str())),
        level,
        service: caps.name("service")?.as_str().to_string(),
        message: caps.name("message")?.as_str().trim().to_string(),
        raw: line.to_string(),
    })
}
