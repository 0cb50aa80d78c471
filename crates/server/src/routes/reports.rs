use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use substation::intake::{RejectedImage, UploadedImage};
use substation::InspectionInterval;

/// Multipart field carrying one image; repeated once per file.
pub const IMAGES_FIELD: &str = "images";
/// Multipart field carrying the interval in days.
pub const DAYS_FIELD: &str = "inspection_days";

/// Generate response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Model output, untouched
    pub report: String,
    /// Preview rendering of `report`
    pub html: String,
    pub inspection_date: NaiveDate,
    pub next_inspection_date: NaiveDate,
    pub images_analyzed: usize,
    pub rejected: Vec<RejectedImage>,
    pub detection_applied: bool,
}

/// Generate an inspection report (POST /api/v1/reports)
///
/// Refused up front when no API key was resolved at startup, before the
/// upload is read.
pub async fn generate_report(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> ServerResult<Json<ReportResponse>> {
    let inspector = state.inspector()?;

    let mut images = Vec::new();
    let mut interval = InspectionInterval::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGES_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;

                // Browsers send one empty part when no file was picked.
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                images.push(UploadedImage::new(filename, content_type, data));
            }
            Some(DAYS_FIELD) => {
                let text = field.text().await?;
                interval = text.parse()?;
            }
            other => {
                tracing::debug!(field = ?other, "ignoring unknown form field");
            }
        }
    }

    tracing::info!(
        images = images.len(),
        interval_days = interval.days(),
        "generate requested"
    );

    let today = chrono::Local::now().date_naive();
    let outcome = inspector
        .inspect(images, interval, today)
        .await
        .map_err(ServerError::from)?;

    Ok(Json(ReportResponse {
        html: outcome.report.html(),
        inspection_date: outcome.report.inspection_date,
        next_inspection_date: outcome.report.next_inspection_date,
        report: outcome.report.text,
        images_analyzed: outcome.images_analyzed,
        rejected: outcome.rejected,
        detection_applied: outcome.detection_applied,
    }))
}
