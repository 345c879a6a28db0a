//! Ticket filing: one Jira issue per incident.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::JiraConfig;
use crate::error::JiraError;
use crate::models::Incident;
use crate::retry::RetryPolicy;

use super::client::JiraClient;
use super::document::CreateIssueRequest;

/// Outcome of filing one incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketResult {
    /// Title the ticket was filed under
    pub incident_title: String,
    /// Browse link, empty on failure
    pub url: String,
}

impl TicketResult {
    /// True when Jira produced a browsable link.
    #[must_use]
    pub fn is_created(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Files Jira tickets for incidents.
#[derive(Clone)]
pub struct TicketFiler {
    client: JiraClient,
}

impl TicketFiler {
    /// Create a filer around an existing client.
    #[must_use]
    pub fn new(client: JiraClient) -> Self {
        Self { client }
    }

    /// Create a filer from configuration.
    pub fn from_config(config: &JiraConfig, retry: RetryPolicy) -> Result<Self, JiraError> {
        Ok(Self::new(JiraClient::new(config.clone(), retry)?))
    }

    /// File `incident` in the default project; failures yield an empty URL.
    pub async fn file(&self, incident: &Incident) -> TicketResult {
        self.file_in_project(incident, None).await
    }

    /// File `incident`, optionally overriding the project; failures yield an empty URL.
    pub async fn file_in_project(
        &self,
        incident: &Incident,
        project_override: Option<&str>,
    ) -> TicketResult {
        match self.try_file(incident, project_override).await {
            Ok(ticket) => ticket,
            Err(e) => {
                let error = format!("{:#}", anyhow::Error::new(e));
                warn!(title = %incident.ticket_title(), %error, "Failed to file ticket");
                TicketResult {
                    incident_title: incident.ticket_title(),
                    url: String::new(),
                }
            }
        }
    }

    /// File `incident`, reporting why it failed.
    pub async fn try_file(
        &self,
        incident: &Incident,
        project_override: Option<&str>,
    ) -> Result<TicketResult, JiraError> {
        let project = self
            .client
            .resolve_project(project_override)
            .ok_or_else(|| JiraError::NotConfigured("JIRA_PROJECT_KEY not set".to_string()))?;

        let request =
            CreateIssueRequest::for_incident(incident, &project, &self.client.config().issue_type);
        let created = self.client.create_issue(&request).await?;

        Ok(TicketResult {
            incident_title: incident.ticket_title(),
            url: created.url,
        })
    }

    /// File every incident with at most `concurrency` requests in flight.
    ///
    /// Results come back in input order regardless of completion order.
    pub async fn file_all(
        &self,
        incidents: &[Incident],
        project_override: Option<&str>,
        concurrency: usize,
    ) -> Vec<Result<TicketResult, JiraError>> {
        let results: Vec<_> = stream::iter(incidents)
            .map(|incident| self.try_file(incident, project_override))
            .buffered(concurrency.max(1))
            .collect()
            .await;

        info!(
            incidents = incidents.len(),
            created = results
                .iter()
                .filter(|r| r.as_ref().is_ok_and(TicketResult::is_created))
                .count(),
            "Ticket filing complete"
        );

        results
    }
}
