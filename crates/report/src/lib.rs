//! Rendering and export of inspection reports.
//!
//! The report is opaque Markdown produced by the model. This crate never
//! parses or corrects it. It offers three views of the same text:
//!
//! - [`render_html`]: preview for the browser form
//! - [`markdown_export`]: byte-identical `.md` download
//! - [`pdf_export`]: line-by-line PDF transcription (see [`pdf`])
//!
//! ```rust
//! use chrono::NaiveDate;
//! use report::{markdown_export, PdfLayout, REPORT_TITLE};
//!
//! let text = "## Summary\nAll intact";
//! let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//!
//! let md = markdown_export(text, date);
//! assert_eq!(md.bytes, text.as_bytes());
//! assert_eq!(md.filename, "inspection_report_20240601.md");
//!
//! let layout = PdfLayout::from_text(REPORT_TITLE, text);
//! assert_eq!(layout.body_lines().count(), 2);
//! ```

pub mod artifact;
pub mod error;
pub mod markdown;
pub mod pdf;

pub use crate::artifact::{export_filename, ExportArtifact, ExportFormat};
pub use crate::error::ReportError;
pub use crate::markdown::{markdown_export, render_html};
pub use crate::pdf::{pdf_export, render_pdf, DrawnLine, PdfFont, PdfLayout, PdfPage, REPORT_TITLE};

use chrono::NaiveDate;

/// Builds the artifact for `format`.
pub fn export(
    format: ExportFormat,
    report: &str,
    date: NaiveDate,
) -> Result<ExportArtifact, ReportError> {
    match format {
        ExportFormat::Markdown => Ok(markdown_export(report, date)),
        ExportFormat::Pdf => pdf_export(report, date),
    }
}
