//! Configuration for the log incident pipeline.
//!
//! Every component receives its slice of [`Config`] at construction time;
//! nothing reads the environment after startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default directory scanned when none is given.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default Gemini model identifier.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini/gemini-2.0-flash";

/// Default Gemini API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Jira project key.
pub const DEFAULT_PROJECT_KEY: &str = "SCRUM";

/// Default Jira issue type.
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

/// Default file the detailed run summary is written to.
pub const DEFAULT_OUTPUT_FILE: &str = "logger_flow_pipeline_result.json";

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Log ingestion settings.
    pub logs: LogConfig,
    /// Analysis service settings.
    pub analysis: AnalysisConfig,
    /// Jira settings.
    pub jira: JiraConfig,
    /// Retry policy for both network boundaries.
    pub retry: RetryPolicy,
    /// Runner settings.
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            logs: LogConfig::from_env(),
            analysis: AnalysisConfig::from_env(),
            jira: JiraConfig::from_env(),
            retry: RetryPolicy::default(),
            pipeline: PipelineConfig::from_env(),
        }
    }
}

/// Log ingestion configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Root directory scanned recursively for `*.log` files.
    pub dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl LogConfig {
    /// Load from `LOG_DIR`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            dir: non_empty_var("LOG_DIR").map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from),
        }
    }

    /// Resolve the directory to scan: explicit override first, then configured.
    #[must_use]
    pub fn resolve(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| self.dir.clone())
    }
}

/// Analysis service (Gemini) configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// API key; analysis is skipped when absent.
    pub api_key: Option<String>,
    /// Model identifier, optionally prefixed with `gemini/`.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum number of records included in the prompt.
    pub max_records: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            max_records: 200,
        }
    }
}

impl AnalysisConfig {
    /// Load from `GEMINI_API_KEY`, `GEMINI_MODEL` and `GEMINI_BASE_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: non_empty_var("GEMINI_API_KEY"),
            model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: non_empty_var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            ..defaults
        }
    }

    /// Model name as the REST API expects it (provider prefix removed).
    #[must_use]
    pub fn api_model(&self) -> &str {
        self.model.strip_prefix("gemini/").unwrap_or(&self.model)
    }
}

/// Jira Cloud configuration.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Instance URL, e.g. `https://your-domain.atlassian.net`.
    pub base_url: Option<String>,
    /// Account email used for basic auth.
    pub email: Option<String>,
    /// API token used for basic auth.
    pub api_token: Option<String>,
    /// Default project key.
    pub project_key: Option<String>,
    /// Issue type name for created issues.
    pub issue_type: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            email: None,
            api_token: None,
            project_key: Some(DEFAULT_PROJECT_KEY.to_string()),
            issue_type: DEFAULT_ISSUE_TYPE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl JiraConfig {
    /// Load from the `JIRA_*` variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: non_empty_var("JIRA_BASE_URL"),
            email: non_empty_var("JIRA_EMAIL"),
            api_token: non_empty_var("JIRA_API_TOKEN"),
            project_key: non_empty_var("JIRA_PROJECT_KEY").or(defaults.project_key),
            issue_type: non_empty_var("JIRA_ISSUE_TYPE").unwrap_or(defaults.issue_type),
            timeout: defaults.timeout,
        }
    }

    /// Base URL without trailing slashes.
    #[must_use]
    pub fn trimmed_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

/// Pipeline runner configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of tickets filed concurrently.
    pub ticket_concurrency: usize,
    /// Where the detailed run summary is written.
    pub output_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ticket_concurrency: 4,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl PipelineConfig {
    /// Load from `LOGFLOW_TICKET_CONCURRENCY` and `LOGFLOW_OUTPUT`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ticket_concurrency: non_empty_var("LOGFLOW_TICKET_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.ticket_concurrency),
            output_path: non_empty_var("LOGFLOW_OUTPUT")
                .map_or(defaults.output_path, PathBuf::from),
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.logs.dir, PathBuf::from("logs"));
        assert_eq!(config.analysis.timeout, Duration::from_secs(30));
        assert_eq!(config.analysis.max_records, 200);
        assert_eq!(config.jira.timeout, Duration::from_secs(15));
        assert_eq!(config.jira.project_key.as_deref(), Some("SCRUM"));
        assert_eq!(config.jira.issue_type, "Task");
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.analysis.api_key.is_none());
    }

    #[test]
    fn test_api_model_strips_provider_prefix() {
        let config = AnalysisConfig::default();
        assert_eq!(config.api_model(), "gemini-2.0-flash");

        let config = AnalysisConfig {
            model: "gemini-1.5-pro".to_string(),
            ..AnalysisConfig::default()
        };
        assert_eq!(config.api_model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_trimmed_base_url() {
        let config = JiraConfig {
            base_url: Some("https://example.atlassian.net//".to_string()),
            ..JiraConfig::default()
        };
        assert_eq!(
            config.trimmed_base_url(),
            Some("https://example.atlassian.net")
        );
        assert_eq!(JiraConfig::default().trimmed_base_url(), None);
    }

    #[test]
    fn test_explicit_log_dir_wins() {
        let config = LogConfig::default();
        assert_eq!(
            config.resolve(Some(PathBuf::from("/var/log/app"))),
            PathBuf::from("/var/log/app")
        );
        assert_eq!(config.resolve(None), PathBuf::from("logs"));
    }
}
