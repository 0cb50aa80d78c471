//! Optional detection pass.
//!
//! A [`Detector`] takes a staged image and writes an annotated copy next to
//! it. The detection model itself is an external collaborator; this crate
//! defines only the seam and a [`CommandDetector`] that shells out to a
//! pretrained detector program.

pub mod config;
pub mod error;
pub mod types;

mod command;

use std::path::Path;

use async_trait::async_trait;

pub use crate::command::CommandDetector;
pub use crate::config::DetectorConfig;
pub use crate::error::DetectError;
pub use crate::types::{Detection, Region};

/// Confidence threshold passed to every detector invocation.
pub const DEFAULT_CONFIDENCE: f32 = 0.3;

#[async_trait]
pub trait Detector: Send + Sync {
    /// Detects components in `source` and writes an annotated image to `output`.
    async fn annotate(&self, source: &Path, output: &Path) -> Result<Detection, DetectError>;
}
