//! Jira Cloud integration for filing incident tickets.
//!
//! # Configuration
//!
//! - `JIRA_BASE_URL`: Jira instance URL (e.g., `https://your-domain.atlassian.net`)
//! - `JIRA_EMAIL`: User email for authentication
//! - `JIRA_API_TOKEN`: Jira API token
//! - `JIRA_PROJECT_KEY`: Default project key (default: `SCRUM`)
//! - `JIRA_ISSUE_TYPE`: Issue type name (default: `Task`)

mod client;
mod document;
mod filer;

pub use client::{CreatedIssue, JiraClient};
pub use document::{
    truncate_summary, AdfDocument, CreateIssueRequest, IssueFields, MAX_SUMMARY_CHARS,
};
pub use filer::{TicketFiler, TicketResult};
