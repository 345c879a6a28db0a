//! Error types for the analysis and issue-tracker boundaries.

use thiserror::Error;

use crate::retry::Retryable;

/// Errors raised while asking the analysis service for incidents.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No API credential configured
    #[error("Analysis service not configured: {0}")]
    NotConfigured(String),

    /// HTTP request failed (DNS, connect, timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Analysis API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Service answered but produced no text
    #[error("Analysis service returned an empty response")]
    EmptyResponse,

    /// Text did not contain a recoverable incident list
    #[error("Could not extract incidents from response: {0}")]
    Unparseable(String),

    /// Prompt template failed to render
    #[error("Prompt rendering failed: {0}")]
    Prompt(String),
}

impl Retryable for AnalysisError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

/// Errors raised while creating Jira issues.
#[derive(Debug, Error)]
pub enum JiraError {
    /// Base URL, credentials or project key missing
    #[error("Jira not configured: {0}")]
    NotConfigured(String),

    /// HTTP request failed (DNS, connect, timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Jira answered with a non-success status
    #[error("Jira API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Every attempt failed with a transient error
    #[error("Jira issue creation failed after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<JiraError>,
    },
}

impl Retryable for JiraError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_transient() {
        let err = JiraError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.is_transient());

        let err = AnalysisError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_errors_are_terminal() {
        let err = JiraError::Api {
            status: 400,
            message: "summary is required".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!JiraError::NotConfigured("JIRA_BASE_URL".to_string()).is_transient());
        assert!(!AnalysisError::NotConfigured("GEMINI_API_KEY".to_string()).is_transient());
        assert!(!AnalysisError::EmptyResponse.is_transient());
    }

    #[test]
    fn test_exhausted_keeps_last_error_as_source() {
        let err = JiraError::RetriesExhausted {
            attempts: 3,
            source: Box::new(JiraError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        };
        assert!(err.to_string().contains("3 attempts"));

        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("502"));
    }
}
