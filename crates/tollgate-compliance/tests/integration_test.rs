//! End-to-end tests for the HTTP client and poller against a local server.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;

use tollgate_compliance::{
    ComplianceApi, ComplianceConfig, HttpComplianceClient, PollConfig, PollOutcome, ScanPoller,
};
use tollgate_core::ApiKeys;

#[derive(Debug, Clone)]
struct Seen {
    image_id: Option<String>,
    api_keys: Option<String>,
}

#[derive(Clone, Default)]
struct FakeService {
    replies: Arc<Mutex<VecDeque<(StatusCode, &'static str)>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

async fn policy_compliance(
    State(service): State<FakeService>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    service.seen.lock().unwrap().push(Seen {
        image_id: query.get("image_id").cloned(),
        api_keys: headers
            .get("x-apikeys")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let (status, body) = service
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::NOT_FOUND, "{}"));
    (status, body.to_string())
}

/// Starts the fake service and returns its endpoint.
async fn start(replies: Vec<(StatusCode, &'static str)>) -> (String, FakeService) {
    let service = FakeService {
        replies: Arc::new(Mutex::new(replies.into())),
        ..FakeService::default()
    };
    let app = Router::new()
        .route("/container-security/api/v1/policycompliance", get(policy_compliance))
        .with_state(service.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    (
        format!("http://{addr}/container-security/api/v1/policycompliance"),
        service,
    )
}

fn client(endpoint: &str) -> HttpComplianceClient {
    HttpComplianceClient::new(
        &ComplianceConfig::new(endpoint).with_timeout(Duration::from_secs(5)),
    )
    .unwrap()
}

fn fast() -> PollConfig {
    PollConfig::builder()
        .max_retries(3)
        .poll_interval(Duration::from_millis(10))
        .build()
}

#[tokio::test]
async fn test_request_carries_image_id_and_api_keys() {
    let (endpoint, service) = start(vec![(StatusCode::OK, r#"{"status":"pass"}"#)]).await;
    let keys = ApiKeys::new("my-access", "my-secret");

    let body = client(&endpoint)
        .fetch_verdict("4e7c1f0a9b2d", Some(&keys))
        .await
        .unwrap();

    assert_eq!(body, r#"{"status":"pass"}"#);
    let seen = service.seen.lock().unwrap();
    assert_eq!(seen[0].image_id.as_deref(), Some("4e7c1f0a9b2d"));
    assert_eq!(
        seen[0].api_keys.as_deref(),
        Some("accessKey=my-access;secretKey=my-secret;")
    );
}

#[tokio::test]
async fn test_no_credentials_sends_no_header() {
    let (endpoint, service) = start(vec![(StatusCode::OK, r#"{"status":"fail"}"#)]).await;

    client(&endpoint).fetch_verdict("", None).await.unwrap();

    let seen = service.seen.lock().unwrap();
    assert_eq!(seen[0].image_id.as_deref(), Some(""));
    assert!(seen[0].api_keys.is_none());
}

#[tokio::test]
async fn test_body_read_regardless_of_status() {
    let (endpoint, _service) = start(vec![(
        StatusCode::SERVICE_UNAVAILABLE,
        r#"{"status":"error","reason":"busy","message":"report_not_ready"}"#,
    )])
    .await;

    let body = client(&endpoint).fetch_verdict("img", None).await.unwrap();
    assert!(body.contains("report_not_ready"));
}

#[tokio::test]
async fn test_poll_until_pass() {
    let (endpoint, service) = start(vec![
        (
            StatusCode::OK,
            r#"{"status":"error","reason":"Report is not ready","message":"report_not_ready"}"#,
        ),
        (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>"),
        (StatusCode::OK, r#"{"status":"pass"}"#),
    ])
    .await;

    let poller = ScanPoller::new(client(&endpoint), fast());
    let report = poller.poll("img", None).await;

    assert!(report.passed());
    assert_eq!(report.attempts, 3);
    assert_eq!(report.retries, 1);
    assert_eq!(service.seen.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_poll_exhausts_on_repeated_errors() {
    let error = r#"{"status":"error","reason":"Scan failed","message":"internal"}"#;
    let (endpoint, service) = start(vec![(StatusCode::OK, error); 5]).await;

    let poller = ScanPoller::new(client(&endpoint), fast());
    let report = poller.poll("img", None).await;

    assert_eq!(report.outcome, PollOutcome::Exhausted);
    assert_eq!(report.retries, 3);
    assert_eq!(service.seen.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unreachable_service_counts_as_retry() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let poller = ScanPoller::new(client(&format!("http://{addr}/check")), fast());
    let report = poller.poll("img", None).await;

    assert_eq!(report.outcome, PollOutcome::Exhausted);
    assert_eq!(report.attempts, 3);
}
