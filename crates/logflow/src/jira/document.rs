//! Jira issue-creation request body.
//!
//! Jira Cloud's v3 API requires descriptions in Atlassian Document Format;
//! we always send a single plain-text paragraph.

use serde::{Deserialize, Serialize};

use crate::models::Incident;

/// Jira's maximum summary length.
pub const MAX_SUMMARY_CHARS: usize = 254;

/// `POST /rest/api/3/issue` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIssueRequest {
    pub fields: IssueFields,
}

/// Fields of a new issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueFields {
    pub project: ProjectRef,
    pub summary: String,
    pub description: AdfDocument,
    pub issuetype: IssueTypeRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueTypeRef {
    pub name: String,
}

/// Atlassian Document Format root node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdfDocument {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub version: u32,
    pub content: Vec<AdfParagraph>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdfParagraph {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub content: Vec<AdfText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdfText {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub text: String,
}

impl AdfDocument {
    /// Document holding `text` as one paragraph.
    #[must_use]
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            node_type: "doc",
            version: 1,
            content: vec![AdfParagraph {
                node_type: "paragraph",
                content: vec![AdfText {
                    node_type: "text",
                    text: text.into(),
                }],
            }],
        }
    }
}

impl CreateIssueRequest {
    /// Build the request for `incident` in `project`.
    #[must_use]
    pub fn for_incident(incident: &Incident, project: &str, issue_type: &str) -> Self {
        Self {
            fields: IssueFields {
                project: ProjectRef {
                    key: project.to_string(),
                },
                summary: truncate_summary(&incident.ticket_title()),
                description: AdfDocument::paragraph(incident.ticket_description()),
                issuetype: IssueTypeRef {
                    name: issue_type.to_string(),
                },
                labels: incident.label().map(sanitize_label).into_iter().collect(),
            },
        }
    }
}

/// Successful `POST /rest/api/3/issue` response.
#[derive(Debug, Deserialize)]
pub struct CreateIssueResponse {
    #[serde(default)]
    pub key: Option<String>,
}

/// Cut `summary` to [`MAX_SUMMARY_CHARS`] characters.
#[must_use]
pub fn truncate_summary(summary: &str) -> String {
    summary.chars().take(MAX_SUMMARY_CHARS).collect()
}

/// Jira labels cannot contain whitespace.
fn sanitize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("-")
}
