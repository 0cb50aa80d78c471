use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The PDF backend refused the document.
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
}
