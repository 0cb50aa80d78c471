use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One labeled bounding region reported by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub label: String,
    pub confidence: f32,
    /// `[x1, y1, x2, y2]` in pixels.
    #[serde(default)]
    pub bbox: [f32; 4],
}

/// Detector output for one source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub source: PathBuf,
    /// Annotated copy, written by the detector.
    pub annotated: PathBuf,
    /// Possibly empty.
    pub regions: Vec<Region>,
}
