//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_router, ModelStatus, ServerConfig, ServerState};
use substation::model::{CredentialError, ImageRef, ModelError, ReportModel, StaticModel};
use substation::Inspector;
use tower::ServiceExt;

const BOUNDARY: &str = "inspection-test-boundary";

enum Part<'a> {
    File {
        filename: &'a str,
        content_type: &'a str,
        data: Vec<u8>,
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"images\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(3, 3, image::Rgb([200, 200, 200]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn png_part(filename: &str) -> Part<'_> {
    Part::File {
        filename,
        content_type: "image/png",
        data: png(),
    }
}

fn generate_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/reports")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn app_with(model: Arc<dyn ReportModel>) -> Router {
    let state = ServerState::with_inspector(ServerConfig::default(), Inspector::new(model));
    build_router(Arc::new(state))
}

fn app_without_credential() -> Router {
    let state = ServerState {
        config: Arc::new(ServerConfig::default()),
        model: ModelStatus::MissingCredential(CredentialError::Missing {
            key: "GEMINI_API_KEY".into(),
            searched: vec!["secrets file".into(), "environment".into()],
        }),
    };
    build_router(Arc::new(state))
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

struct FailingModel;

#[async_trait]
impl ReportModel for FailingModel {
    fn model_name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str, _images: &[ImageRef]) -> Result<String, ModelError> {
        Err(ModelError::Status {
            status: 500,
            body: "internal provider trace id=xyz".into(),
        })
    }
}

#[tokio::test]
async fn index_serves_upload_form() {
    let app = app_with(Arc::new(StaticModel::default()));
    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("name=\"images\""));
    assert!(html.contains("name=\"inspection_days\""));
    assert!(html.contains("min=\"1\" max=\"30\" value=\"7\""));
    assert!(html.contains("id=\"preview\""));
    assert!(html.contains("URL.createObjectURL(file)"));
    assert!(html.contains("fetch(\"/ready\")"));
}

#[tokio::test]
async fn generate_returns_report_and_preview() {
    let model = Arc::new(StaticModel::new("## Summary\nAll intact"));
    let app = app_with(model.clone());

    let response = app
        .oneshot(generate_request(&[
            png_part("a.png"),
            png_part("b.png"),
            Part::Text {
                name: "inspection_days",
                value: "7",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["report"], "## Summary\nAll intact");
    assert!(body["html"].as_str().unwrap().contains("<h2>Summary</h2>"));
    assert_eq!(body["images_analyzed"], 2);
    assert_eq!(body["detection_applied"], false);
    assert_eq!(body["rejected"], json!([]));

    let today = chrono::NaiveDate::parse_from_str(
        body["inspection_date"].as_str().unwrap(),
        "%Y-%m-%d",
    )
    .unwrap();
    let next = chrono::NaiveDate::parse_from_str(
        body["next_inspection_date"].as_str().unwrap(),
        "%Y-%m-%d",
    )
    .unwrap();
    assert_eq!((next - today).num_days(), 7);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn unsupported_files_are_listed_as_rejected() {
    let app = app_with(Arc::new(StaticModel::default()));

    let response = app
        .oneshot(generate_request(&[
            Part::File {
                filename: "scan.gif",
                content_type: "image/gif",
                data: b"GIF89a".to_vec(),
            },
            png_part("tower.png"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["images_analyzed"], 1);
    assert_eq!(body["rejected"][0]["filename"], "scan.gif");
}

#[tokio::test]
async fn out_of_range_interval_is_bad_request() {
    let model = Arc::new(StaticModel::default());
    let app = app_with(model.clone());

    let response = app
        .oneshot(generate_request(&[
            png_part("a.png"),
            Part::Text {
                name: "inspection_days",
                value: "31",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn no_images_is_unprocessable() {
    let model = Arc::new(StaticModel::default());
    let app = app_with(model.clone());

    let response = app
        .oneshot(generate_request(&[
            Part::File {
                filename: "",
                content_type: "application/octet-stream",
                data: Vec::new(),
            },
            Part::Text {
                name: "inspection_days",
                value: "7",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NO_VALID_IMAGES");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn missing_credential_blocks_generate() {
    let app = app_without_credential();

    let response = app
        .oneshot(generate_request(&[png_part("a.png")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn model_failure_is_generic_bad_gateway() {
    let app = app_with(Arc::new(FailingModel));

    let response = app
        .oneshot(generate_request(&[png_part("a.png")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MODEL_ERROR");
    assert!(!body["error"]["message"].as_str().unwrap().contains("xyz"));
}

#[tokio::test]
async fn markdown_export_is_byte_identical() {
    let app = app_with(Arc::new(StaticModel::default()));
    let report = "## Summary\r\n| Towers | 1 |\n**Next Inspection Date:** 2024-06-08";

    let response = app
        .oneshot(json_request(
            "/api/v1/export/markdown",
            json!({ "report": report, "inspection_date": "2024-06-01" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"inspection_report_20240601.md\""
    );
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/markdown; charset=utf-8"
    );
    assert_eq!(body_bytes(response).await, report.as_bytes());
}

#[tokio::test]
async fn pdf_export_is_attachment() {
    let app = app_with(Arc::new(StaticModel::default()));

    let response = app
        .oneshot(json_request(
            "/api/v1/export/pdf",
            json!({ "report": "## Summary\nAll intact", "inspection_date": "2024-06-01" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"inspection_report_20240601.pdf\""
    );
    assert!(body_bytes(response).await.starts_with(b"%PDF"));
}

#[tokio::test]
async fn readiness_reflects_credential() {
    let ready = app_with(Arc::new(StaticModel::default()))
        .oneshot(get("/ready"))
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    let body = body_json(ready).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["components"]["detection"], "disabled");
    assert!(body["error"].is_null());

    let not_ready = app_without_credential()
        .oneshot(get("/ready"))
        .await
        .unwrap();
    assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(not_ready).await;
    assert_eq!(body["components"]["credential"], "missing");
    assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn health_and_fallback() {
    let app = app_with(Arc::new(StaticModel::default()));

    let health = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await["status"], "healthy");

    let missing = app.oneshot(get("/api/v1/nope")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = app_with(Arc::new(StaticModel::default()));
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}
