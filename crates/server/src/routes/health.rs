use crate::state::{ModelStatus, ServerState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "inspection-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
/// Returns 503 while no API key is available, since Generate would be refused
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let (status, code, model, detection) = match &state.model {
        ModelStatus::Ready(inspector) => (
            "ready",
            StatusCode::OK,
            inspector.model_name().to_string(),
            inspector.detection_enabled(),
        ),
        ModelStatus::MissingCredential(_) => (
            "not_ready",
            StatusCode::SERVICE_UNAVAILABLE,
            state.config.model.model_name.clone(),
            state.config.detector.enabled,
        ),
    };

    // Same code and message Generate would answer with.
    let error = state.inspector().err().map(|err| {
        json!({
            "code": err.error_code(),
            "message": err.to_string(),
        })
    });

    let body = Json(json!({
        "status": status,
        "error": error,
        "service": "inspection-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "credential": if status == "ready" { "resolved" } else { "missing" },
            "model": model,
            "detection": if detection { "enabled" } else { "disabled" },
        }
    }));

    (code, body)
}
