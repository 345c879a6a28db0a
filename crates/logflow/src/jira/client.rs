//! Jira Cloud REST client.
//!
//! Only issue creation is needed. Server errors and transport failures are
//! retried under the configured [`RetryPolicy`]; client errors are final.

use reqwest::{header, Client};
use tracing::{error, info, instrument, warn};

use crate::config::JiraConfig;
use crate::error::JiraError;
use crate::retry::{RetryPolicy, Retryable};

use super::document::{CreateIssueRequest, CreateIssueResponse};

/// An issue Jira accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    /// Issue key, e.g. `SCRUM-42`
    pub key: Option<String>,
    /// Browse link; empty when Jira returned no key
    pub url: String,
}

/// Credentials resolved from configuration.
struct Credentials<'a> {
    base_url: &'a str,
    email: &'a str,
    api_token: &'a str,
}

/// Jira REST API client.
#[derive(Clone)]
pub struct JiraClient {
    http_client: Client,
    config: JiraConfig,
    retry: RetryPolicy,
}

impl JiraClient {
    /// Create a client; requests are bounded by `config.timeout`.
    pub fn new(config: JiraConfig, retry: RetryPolicy) -> Result<Self, JiraError> {
        let http_client = Client::builder()
            .user_agent("logflow/1.0")
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            config,
            retry,
        })
    }

    /// Configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// Project key to use: per-call override first, then the configured default.
    #[must_use]
    pub fn resolve_project(&self, project_override: Option<&str>) -> Option<String> {
        project_override
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(ToString::to_string)
            .or_else(|| {
                self.config
                    .project_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(ToString::to_string)
            })
    }

    /// Browse URL for an issue key.
    #[must_use]
    pub fn browse_url(&self, key: &str) -> Option<String> {
        self.config
            .trimmed_base_url()
            .map(|base| format!("{base}/browse/{key}"))
    }

    /// Create an issue, retrying transient failures.
    #[instrument(skip(self, request), fields(project = %request.fields.project.key))]
    pub async fn create_issue(&self, request: &CreateIssueRequest) -> Result<CreatedIssue, JiraError> {
        let credentials = self.credentials()?;
        let url = format!("{}/rest/api/3/issue", credentials.base_url);
        let credentials = &credentials;
        let url = url.as_str();

        let result = self
            .retry
            .run("jira_create_issue", move |attempt| {
                self.post_issue(url, credentials, request, attempt)
            })
            .await;

        match result {
            Err(e) if e.is_transient() => {
                error!(
                    attempts = self.retry.max_attempts,
                    error = %e,
                    "Failed to create Jira issue after all attempts"
                );
                Err(JiraError::RetriesExhausted {
                    attempts: self.retry.max_attempts.max(1),
                    source: Box::new(e),
                })
            }
            other => other,
        }
    }

    fn credentials(&self) -> Result<Credentials<'_>, JiraError> {
        let base_url = self
            .config
            .trimmed_base_url()
            .ok_or_else(|| JiraError::NotConfigured("JIRA_BASE_URL not set".to_string()))?;
        let email = self
            .config
            .email
            .as_deref()
            .ok_or_else(|| JiraError::NotConfigured("JIRA_EMAIL not set".to_string()))?;
        let api_token = self
            .config
            .api_token
            .as_deref()
            .ok_or_else(|| JiraError::NotConfigured("JIRA_API_TOKEN not set".to_string()))?;

        Ok(Credentials {
            base_url,
            email,
            api_token,
        })
    }

    async fn post_issue(
        &self,
        url: &str,
        credentials: &Credentials<'_>,
        request: &CreateIssueRequest,
        attempt: u32,
    ) -> Result<CreatedIssue, JiraError> {
        let response = self
            .http_client
            .post(url)
            .basic_auth(credentials.email, Some(credentials.api_token))
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .map_or_else(|_| body.clone(), |json| json.to_string());
            error!(
                status = status.as_u16(),
                attempt,
                body = %detail,
                "Jira API returned HTTP error"
            );
            return Err(JiraError::Api {
                status: status.as_u16(),
                message: detail,
            });
        }

        // Jira has created the issue by now; retrying would file a duplicate.
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Jira accepted the issue but the response body could not be read");
                return Ok(CreatedIssue {
                    key: None,
                    url: String::new(),
                });
            }
        };

        let key = match serde_json::from_str::<CreateIssueResponse>(&body) {
            Ok(parsed) => parsed.key.filter(|k| !k.is_empty()),
            Err(e) => {
                warn!(error = %e, "Jira accepted the issue but the response was not JSON");
                None
            }
        };

        let url = key
            .as_deref()
            .and_then(|k| self.browse_url(k))
            .unwrap_or_default();

        match &key {
            Some(key) => info!(key = %key, url = %url, "Created Jira issue"),
            None => warn!("Jira accepted the issue but returned no key"),
        }

        Ok(CreatedIssue { key, url })
    }
}
