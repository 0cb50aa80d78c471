use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use substation::intake::IntakeError;
use substation::report::ReportError;
use substation::{InspectionFailure, PipelineError, PromptError};

pub type ServerResult<T> = Result<T, ServerError>;

/// Shown instead of provider details, which stay in the log.
const MODEL_FAILURE_MESSAGE: &str =
    "The inspection report could not be generated. Please try again later.";
const DETECTION_FAILURE_MESSAGE: &str = "Component detection failed for the uploaded images.";

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("API key missing: {0}")]
    MissingCredential(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NoValidImages(String),

    #[error("{}", DETECTION_FAILURE_MESSAGE)]
    Detection,

    #[error("{}", MODEL_FAILURE_MESSAGE)]
    Model,

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::MissingCredential(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NoValidImages(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Detection | ServerError::Model => StatusCode::BAD_GATEWAY,
            ServerError::Export(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::MissingCredential(_) => "MISSING_CREDENTIAL",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::NoValidImages(_) => "NO_VALID_IMAGES",
            ServerError::Detection => "DETECTION_ERROR",
            ServerError::Model => "MODEL_ERROR",
            ServerError::Export(_) => "EXPORT_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Intake(err @ IntakeError::NoValidImages { .. }) => {
                ServerError::NoValidImages(err.to_string())
            }
            PipelineError::Intake(err @ IntakeError::TooManyImages { .. }) => {
                ServerError::BadRequest(err.to_string())
            }
            PipelineError::Intake(err) => ServerError::Internal(err.to_string()),
            PipelineError::Detection(err) => {
                tracing::error!(error = %err, "detection pass failed");
                ServerError::Detection
            }
            PipelineError::Model(err) => {
                tracing::error!(error = %err, "report request failed");
                ServerError::Model
            }
            err @ (PipelineError::Staging(_) | PipelineError::Stage(_)) => {
                ServerError::Internal(err.to_string())
            }
        }
    }
}

impl From<InspectionFailure> for ServerError {
    fn from(failure: InspectionFailure) -> Self {
        tracing::debug!(stages = ?failure.stages, "generate action stopped");
        ServerError::from(failure.error)
    }
}

impl From<PromptError> for ServerError {
    fn from(err: PromptError) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}

impl From<ReportError> for ServerError {
    fn from(err: ReportError) -> Self {
        tracing::error!(error = %err, "export failed");
        ServerError::Export(err.to_string())
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        ServerError::BadRequest(format!("Invalid upload: {}", err.body_text()))
    }
}
