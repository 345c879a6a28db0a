//! End-to-end pipeline tests: log files on disk, a scripted analysis
//! provider, and a mock Jira server.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logflow::config::{JiraConfig, PipelineConfig};
use logflow::{
    AnalysisError, CompletionProvider, IncidentExtractor, PipelineRunner, RetryPolicy,
    RunSummary, Stage, TicketFiler,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISSUE_PATH: &str = "/rest/api/3/issue";

// =============================================================================
// Test fixtures
// =============================================================================

enum Reply {
    Text(String),
    Panic,
}

struct FixedProvider {
    reply: Reply,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn text(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn panicking() -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Panic,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, _prompt: &str) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Panic => panic!("provider exploded"),
        }
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        backoff_unit: Duration::from_millis(1),
        ..RetryPolicy::default()
    }
}

fn jira_config(base_url: &str) -> JiraConfig {
    JiraConfig {
        base_url: Some(base_url.to_string()),
        email: Some("bot@example.com".to_string()),
        api_token: Some("secret-token".to_string()),
        ..JiraConfig::default()
    }
}

fn runner(dir: &Path, provider: Arc<FixedProvider>, jira: &JiraConfig) -> PipelineRunner {
    let extractor = IncidentExtractor::new(provider, 200, fast_retry()).unwrap();
    let filer = TicketFiler::from_config(jira, fast_retry()).unwrap();
    PipelineRunner::new(dir, extractor, filer, PipelineConfig::default())
}

fn write_log(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

async fn jira_returning(key: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ISSUE_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"key": key})))
        .mount(&server)
        .await;
    server
}

const DISK_FULL_REPLY: &str = r#"{"incidents":[{"title":"Disk full on web","description":"Root volume is full","service":"web","severity":"HIGH","occurrences":1}]}"#;

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_single_incident_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_log(
        dir.path(),
        "app.log",
        "[2025-11-26T12:00:01Z] [ERROR] [web] Disk full\n",
    );
    let server = jira_returning("SCRUM-42").await;
    let provider = FixedProvider::text(DISK_FULL_REPLY);

    let summary = runner(dir.path(), provider.clone(), &jira_config(&server.uri()))
        .run()
        .await;

    assert_eq!(summary.logs_scanned, 1);
    assert_eq!(summary.incidents_detected, 1);
    assert_eq!(summary.jira_tickets_created, 1);
    assert!(summary.errors.is_empty(), "errors: {:?}", summary.errors);

    assert_eq!(summary.incidents[0].title, "Disk full on web");
    assert_eq!(summary.tickets.len(), 1);
    assert_eq!(summary.tickets[0].incident_title, "Disk full on web");
    assert!(summary.tickets[0].url.ends_with("/browse/SCRUM-42"));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_project_override_reaches_jira() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "app.log", "[2025-11-26T12:00:01Z] [ERROR] [web] Disk full\n");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ISSUE_PATH))
        .and(body_partial_json(json!({"fields": {"project": {"key": "OPS"}}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"key": "OPS-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let summary = runner(
        dir.path(),
        FixedProvider::text(DISK_FULL_REPLY),
        &jira_config(&server.uri()),
    )
    .with_project(Some("OPS".to_string()))
    .run()
    .await;

    assert_eq!(summary.jira_tickets_created, 1);
    assert!(summary.tickets[0].url.ends_with("/browse/OPS-1"));
}

// =============================================================================
// Nothing to do
// =============================================================================

#[tokio::test]
async fn test_empty_directory_reports_zero_counts() {
    let dir = tempfile::tempdir().unwrap();
    let server = jira_returning("SCRUM-1").await;
    let provider = FixedProvider::text(DISK_FULL_REPLY);

    let summary = runner(dir.path(), provider.clone(), &jira_config(&server.uri()))
        .run()
        .await;

    assert_eq!(summary, RunSummary::default());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_missing_directory_reports_zero_counts() {
    let dir = tempfile::tempdir().unwrap();
    let server = jira_returning("SCRUM-1").await;

    let summary = runner(
        &dir.path().join("nope"),
        FixedProvider::text(DISK_FULL_REPLY),
        &jira_config(&server.uri()),
    )
    .run()
    .await;

    assert_eq!(summary.counts().logs_scanned, 0);
    assert_eq!(summary.incidents_detected, 0);
    assert_eq!(summary.jira_tickets_created, 0);
}

#[tokio::test]
async fn test_no_incidents_files_no_tickets() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "app.log", "[2025-11-26T12:00:01Z] [INFO] [web] all good\n");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let summary = runner(dir.path(), FixedProvider::text("[]"), &jira_config(&server.uri()))
        .run()
        .await;

    assert_eq!(summary.logs_scanned, 1);
    assert_eq!(summary.incidents_detected, 0);
    assert!(summary.errors.is_empty());
}

// =============================================================================
// Stage failures
// =============================================================================

#[tokio::test]
async fn test_unparseable_analysis_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "app.log", "[2025-11-26T12:00:01Z] [ERROR] [web] Disk full\n");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let summary = runner(
        dir.path(),
        FixedProvider::text("Everything looks fine to me."),
        &jira_config(&server.uri()),
    )
    .run()
    .await;

    assert_eq!(summary.logs_scanned, 1);
    assert_eq!(summary.incidents_detected, 0);
    assert_eq!(summary.jira_tickets_created, 0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].stage, Stage::Analyze);
}

#[tokio::test]
async fn test_one_ticket_failure_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    write_log(
        dir.path(),
        "app.log",
        "[2025-11-26T12:00:01Z] [ERROR] [web] Disk full\n\
         [2025-11-26T12:00:02Z] [ERROR] [db] Connection reset\n",
    );
    let reply = r#"[
        {"title":"Disk full on web","service":"web","severity":"HIGH","occurrences":1},
        {"title":"Database resets","service":"db","severity":"MEDIUM","occurrences":1}
    ]"#;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ISSUE_PATH))
        .and(body_partial_json(json!({"fields": {"summary": "Disk full on web"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"key": "SCRUM-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ISSUE_PATH))
        .and(body_partial_json(json!({"fields": {"summary": "Database resets"}})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": {"labels": "Field 'labels' cannot be set."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let summary = runner(dir.path(), FixedProvider::text(reply), &jira_config(&server.uri()))
        .run()
        .await;

    assert_eq!(summary.incidents_detected, 2);
    assert_eq!(summary.jira_tickets_created, 1);
    assert_eq!(summary.tickets.len(), 1);
    assert!(summary.tickets[0].url.ends_with("/browse/SCRUM-1"));

    assert_eq!(summary.errors.len(), 1);
    let err = &summary.errors[0];
    assert_eq!(err.stage, Stage::Ticket);
    assert_eq!(err.incident.as_deref(), Some("Database resets"));
    assert!(err.message.contains("400"), "message: {}", err.message);
}

#[tokio::test]
async fn test_keyless_ticket_is_not_counted() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "app.log", "[2025-11-26T12:00:01Z] [ERROR] [web] Disk full\n");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ISSUE_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let summary = runner(
        dir.path(),
        FixedProvider::text(DISK_FULL_REPLY),
        &jira_config(&server.uri()),
    )
    .run()
    .await;

    assert_eq!(summary.incidents_detected, 1);
    assert_eq!(summary.jira_tickets_created, 0);
    assert!(summary.tickets.is_empty());
    assert!(summary.errors.is_empty());
}

#[tokio::test]
async fn test_unconfigured_jira_records_ticket_errors() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "app.log", "[2025-11-26T12:00:01Z] [ERROR] [web] Disk full\n");

    let summary = runner(
        dir.path(),
        FixedProvider::text(DISK_FULL_REPLY),
        &JiraConfig::default(),
    )
    .run()
    .await;

    assert_eq!(summary.incidents_detected, 1);
    assert_eq!(summary.jira_tickets_created, 0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].stage, Stage::Ticket);
}

#[tokio::test]
async fn test_panic_is_contained() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "app.log", "[2025-11-26T12:00:01Z] [ERROR] [web] Disk full\n");
    let server = jira_returning("SCRUM-1").await;

    let summary = runner(
        dir.path(),
        FixedProvider::panicking(),
        &jira_config(&server.uri()),
    )
    .run()
    .await;

    assert_eq!(summary.logs_scanned, 1);
    assert_eq!(summary.incidents_detected, 0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].stage, Stage::Pipeline);
    assert!(summary.errors[0].message.contains("provider exploded"));
}

// =============================================================================
// Summary file
// =============================================================================

#[tokio::test]
async fn test_summary_file_is_written() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "app.log", "[2025-11-26T12:00:01Z] [ERROR] [web] Disk full\n");
    let server = jira_returning("SCRUM-42").await;

    let summary = runner(
        dir.path(),
        FixedProvider::text(DISK_FULL_REPLY),
        &jira_config(&server.uri()),
    )
    .run()
    .await;

    let output = dir.path().join("logger_flow_pipeline_result.json");
    summary.write_json(&output).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["logs_scanned"], 1);
    assert_eq!(written["jira_tickets_created"], 1);
    assert_eq!(written["incidents"][0]["service"], "web");
    assert!(written["tickets"][0]["url"]
        .as_str()
        .unwrap()
        .ends_with("/browse/SCRUM-42"));
    assert_eq!(written["errors"], json!([]));
}
