use crate::error::ServerResult;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use substation::report::{self, ExportArtifact, ExportFormat};

/// Export request body
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// Report text exactly as returned by Generate
    pub report: String,
    /// Names the file; today when absent
    #[serde(default)]
    pub inspection_date: Option<NaiveDate>,
}

/// Markdown download (POST /api/v1/export/markdown)
pub async fn export_markdown(Json(request): Json<ExportRequest>) -> ServerResult<Response> {
    export(ExportFormat::Markdown, request)
}

/// PDF download (POST /api/v1/export/pdf)
pub async fn export_pdf(Json(request): Json<ExportRequest>) -> ServerResult<Response> {
    export(ExportFormat::Pdf, request)
}

fn export(format: ExportFormat, request: ExportRequest) -> ServerResult<Response> {
    let date = request
        .inspection_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let artifact = report::export(format, &request.report, date)?;
    tracing::info!(
        format = ?format,
        filename = %artifact.filename,
        bytes = artifact.bytes.len(),
        "report exported"
    );
    Ok(attachment(artifact))
}

fn attachment(artifact: ExportArtifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    (
        [
            (header::CONTENT_TYPE, artifact.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response()
}
