//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `reports`: the Generate action (multipart upload)
//! - `export`: Markdown and PDF downloads

pub mod export;
pub mod health;
pub mod reports;

use crate::error::ServerError;
use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Upload form (GET /)
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
