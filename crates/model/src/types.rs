use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// One image handed to the model, in upload order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Local file to upload (usually a staged temporary file).
    pub path: PathBuf,
    /// MIME type declared to the provider, e.g. `image/png`.
    pub mime_type: String,
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// A hosted generative model that turns a prompt plus images into text.
#[async_trait]
pub trait ReportModel: Send + Sync {
    /// Model identifier, surfaced in logs.
    fn model_name(&self) -> &str;

    /// One generation request: `prompt` first, then every image in order.
    /// Returns the model's text verbatim.
    async fn generate(&self, prompt: &str, images: &[ImageRef]) -> Result<String, ModelError>;
}
