//! Gemini client against a mock provider.

use std::time::Duration;

use model::{ApiKey, GeminiClient, ImageRef, ModelConfig, ModelError, ReportModel, RetryConfig};
use serde_json::{json, Value};
use wiremock::matchers::{header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    let cfg = ModelConfig {
        api_base: server.uri(),
        request_timeout_secs: 5,
        retry: RetryConfig::default()
            .with_base_delay(Duration::from_millis(1))
            .with_jitter(false),
        ..Default::default()
    };
    GeminiClient::new(cfg, ApiKey::new("test-key").unwrap()).unwrap()
}

async fn mount_uploads(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("x-goog-upload-command", "start"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", format!("{}/upload-session/1", server.uri())),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .and(headers("x-goog-upload-command", vec!["upload", "finalize"]))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": { "name": "files/abc", "uri": "https://files.example/abc", "mimeType": "image/png" }
        })))
        .mount(server)
        .await;
}

fn write_images(dir: &tempfile::TempDir, count: usize) -> Vec<ImageRef> {
    (0..count)
        .map(|i| {
            let path = dir.path().join(format!("{i}.png"));
            std::fs::write(&path, [0x89, b'P', b'N', b'G', i as u8]).unwrap();
            ImageRef::new(path, "image/png")
        })
        .collect()
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

#[tokio::test]
async fn uploads_each_image_then_generates_once() {
    let server = MockServer::start().await;
    mount_uploads(&server).await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(text_response("## Summary\nAll intact"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let images = write_images(&dir, 2);
    let text = client_for(&server)
        .generate("inspect these", &images)
        .await
        .unwrap();

    assert_eq!(text, "## Summary\nAll intact");

    let requests = server.received_requests().await.unwrap();
    let generate: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == GENERATE_PATH)
        .collect();
    assert_eq!(generate.len(), 1);

    let body: Value = generate[0].body_json().unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0]["text"], "inspect these");
    assert_eq!(parts[1]["file_data"]["file_uri"], "https://files.example/abc");
    assert_eq!(parts[2]["file_data"]["mime_type"], "image/png");

    let finalize_count = requests
        .iter()
        .filter(|r| r.url.path() == "/upload-session/1")
        .count();
    assert_eq!(finalize_count, 2);
}

#[tokio::test]
async fn transient_generation_failure_is_retried_once() {
    let server = MockServer::start().await;
    mount_uploads(&server).await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(text_response("recovered"))
        .with_priority(2)
        .mount(&server)
        .await;

    let text = client_for(&server).generate("p", &[]).await.unwrap();
    assert_eq!(text, "recovered");
}

#[tokio::test]
async fn persistent_transient_failure_gives_up_after_one_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p", &[]).await.unwrap_err();
    assert!(matches!(err, ModelError::Status { status: 429, .. }));
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p", &[]).await.unwrap_err();
    match err {
        ModelError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(text_response("late").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let cfg = ModelConfig {
        api_base: server.uri(),
        request_timeout_secs: 1,
        retry: RetryConfig::disabled(),
        ..Default::default()
    };
    let client = GeminiClient::new(cfg, ApiKey::new("test-key").unwrap()).unwrap();

    let err = client.generate("p", &[]).await.unwrap_err();
    assert!(matches!(err, ModelError::Timeout));
}

#[tokio::test]
async fn missing_upload_url_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let images = write_images(&dir, 1);
    let err = client_for(&server).generate("p", &images).await.unwrap_err();
    assert!(matches!(err, ModelError::MalformedResponse(_)));

    let generated = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .any(|r| r.url.path() == GENERATE_PATH);
    assert!(!generated);
}

#[tokio::test]
async fn unreadable_image_fails_before_any_request() {
    let server = MockServer::start().await;
    let missing = ImageRef::new("/nonexistent/dir/0.png", "image/png");

    let err = client_for(&server).generate("p", &[missing]).await.unwrap_err();
    assert!(matches!(err, ModelError::ReadImage { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
