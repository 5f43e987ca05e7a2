//! End-to-end contract tests for the detection client facade against a mock
//! backend: the spec scenarios for scan, history ordering, report encoding,
//! and the anonymous quota lifecycle.

use dfshield_client::config::Settings;
use dfshield_client::error::ApiError;
use dfshield_client::models::{Decision, ImageFile, ReportSubmission};
use dfshield_client::quota::MemoryQuotaStore;
use dfshield_client::DetectionClient;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DetectionClient {
    let settings = Settings::with_base_url(server.uri());
    DetectionClient::with_quota_store(settings, Box::new(MemoryQuotaStore::new())).unwrap()
}

fn jpeg() -> ImageFile {
    ImageFile::jpeg(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00], "photo.jpg")
}

fn fake_scan_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "label": "fake",
        "confidence": 0.92,
        "threshold": 0.8
    }))
}

#[tokio::test]
async fn nonsense_timeout_settings_error_instead_of_panicking() {
    let mut settings = Settings::with_base_url("http://localhost:5000");
    settings.request_timeout_seconds = f64::NAN;
    assert!(matches!(
        DetectionClient::new(settings).unwrap_err(),
        ApiError::Configuration(_)
    ));

    let mut settings = Settings::with_base_url("http://localhost:5000");
    settings.request_timeout_seconds = 1e300;
    assert!(matches!(
        DetectionClient::new(settings).unwrap_err(),
        ApiError::Configuration(_)
    ));
}

#[tokio::test]
async fn anonymous_scan_yields_confident_fake_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(fake_scan_response())
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.scan(&jpeg(), None).await.unwrap();

    assert_eq!(result.decision, Decision::Fake);
    assert_eq!(result.confidence, 0.92);
    assert_eq!(result.threshold, Some(0.8));
    assert_eq!(result.is_confident, Some(true));
}

#[tokio::test]
async fn backend_failure_surfaces_raw_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.scan(&jpeg(), Some("u1")).await.unwrap_err();

    assert_eq!(err.to_string(), "model unavailable");
    assert!(matches!(err, ApiError::Transport { .. }));
}

#[tokio::test]
async fn empty_report_note_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut report = ReportSubmission::new("u1", "");
    report.filename = Some("x.jpg".to_string());

    let err = client.submit_report(&report).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn history_is_sorted_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/history"))
        .and(body_json(serde_json::json!({"userId": "u1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"filename": "a.jpg", "label": "real", "timestamp": "2025-01-01T00:00:00Z"},
            {"filename": "b.jpg", "decision": "fake", "timestamp": "2025-01-02T00:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let entries = client.history("u1").await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].filename.as_deref(), Some("b.jpg"));
    assert_eq!(entries[0].decision, Decision::Fake);
    assert_eq!(entries[1].filename.as_deref(), Some("a.jpg"));
    assert_eq!(entries[1].decision, Decision::Real);
}

#[tokio::test]
async fn anonymous_quota_allows_three_scans_then_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(fake_scan_response())
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.anonymous_scans_remaining(), 3);

    for _ in 0..3 {
        client.scan(&jpeg(), None).await.unwrap();
    }
    assert_eq!(client.anonymous_scans_remaining(), 0);

    // The fourth attempt short-circuits locally; the mock's expect(3) above
    // verifies no request went out.
    let err = client.scan(&jpeg(), None).await.unwrap_err();
    assert!(matches!(err, ApiError::QuotaExceeded { remaining: 0 }));
}

#[tokio::test]
async fn failed_scan_does_not_consume_quota() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let before = client.anonymous_scans_remaining();
    let _ = client.scan(&jpeg(), None).await.unwrap_err();

    assert_eq!(client.anonymous_scans_remaining(), before);
}

#[tokio::test]
async fn signed_in_users_are_not_quota_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(fake_scan_response())
        .mount(&server)
        .await;

    let client = client_for(&server);
    for _ in 0..5 {
        client.scan(&jpeg(), Some("u1")).await.unwrap();
    }
    // Authenticated scans never touched the anonymous counter
    assert_eq!(client.anonymous_scans_remaining(), 3);
}

#[tokio::test]
async fn sign_in_lifts_an_exhausted_quota() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(fake_scan_response())
        .mount(&server)
        .await;

    let client = client_for(&server);
    for _ in 0..3 {
        client.scan(&jpeg(), None).await.unwrap();
    }
    assert!(matches!(
        client.scan(&jpeg(), None).await.unwrap_err(),
        ApiError::QuotaExceeded { .. }
    ));

    client.sign_in();
    client.scan(&jpeg(), None).await.unwrap();
}

#[tokio::test]
async fn report_with_image_goes_multipart_without_goes_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let plain = ReportSubmission::new("u1", "no image attached");
    client.submit_report(&plain).await.unwrap();

    let with_image =
        ReportSubmission::new("u1", "image attached").with_image(jpeg());
    client.submit_report(&with_image).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let content_types: Vec<String> = requests
        .iter()
        .map(|r| {
            r.headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string()
        })
        .collect();

    assert!(content_types[0].starts_with("application/json"));
    assert!(content_types[1].starts_with("multipart/form-data"));
}

#[tokio::test]
async fn scan_with_user_id_passes_it_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(fake_scan_response())
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.scan(&jpeg(), Some("u1")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"userId\""));
    assert!(body.contains("u1"));
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"photo.jpg\""));
}
