use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised when no credential source yields a usable API key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Every source was consulted and none held a non-empty value.
    #[error("no API key found: set {key} in {}", searched.join(" or "))]
    Missing { key: String, searched: Vec<String> },
}

/// Errors surfaced by a [`ReportModel`](crate::ReportModel) call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Client configuration is unusable (bad base URL, zero timeout, ...).
    #[error("invalid model config: {0}")]
    InvalidConfig(String),
    /// A staged image could not be read back from disk for upload.
    #[error("failed to read image {}: {source}", path.display())]
    ReadImage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// Connection-level failure before an HTTP status was received.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The provider answered 2xx but the body was not what we expected.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    /// The first candidate carried no text parts.
    #[error("model response contained no text")]
    EmptyResponse,
}

impl ModelError {
    /// Transient failures are worth one more attempt; everything else fails fast.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Timeout | ModelError::Transport(_) => true,
            ModelError::Status { status, .. } => {
                matches!(*status, 408 | 429) || (500..=599).contains(status)
            }
            ModelError::InvalidConfig(_)
            | ModelError::ReadImage { .. }
            | ModelError::MalformedResponse(_)
            | ModelError::EmptyResponse => false,
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout
        } else if err.is_decode() {
            ModelError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ModelError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ModelError::Transport(err.to_string())
        }
    }
}
