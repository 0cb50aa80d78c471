use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Image formats accepted for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Jpeg,
    Png,
}

impl MediaType {
    /// Resolves the declared content type, falling back to the file
    /// extension when the browser sent nothing useful.
    pub fn from_declared(content_type: Option<&str>, filename: &str) -> Option<Self> {
        let declared = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        match declared.as_deref() {
            Some("image/jpeg") | Some("image/jpg") | Some("image/pjpeg") => Some(MediaType::Jpeg),
            Some("image/png") => Some(MediaType::Png),
            Some(_) => None,
            None => Self::from_extension(filename),
        }
    }

    pub fn from_extension(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Jpeg => "jpg",
            MediaType::Png => "png",
        }
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            MediaType::Jpeg => image::ImageFormat::Jpeg,
            MediaType::Png => image::ImageFormat::Png,
        }
    }
}

/// One file as received from the upload form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    /// Content type declared by the client, if any.
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedImage {
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data: data.into(),
        }
    }
}

/// An upload that decoded cleanly as its declared format.
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    pub filename: String,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

/// A validated image written to the request's staging area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    /// Position in the original upload order.
    pub index: usize,
    pub filename: String,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
    pub path: PathBuf,
}

/// A file skipped during intake, with a user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedImage {
    pub filename: String,
    pub reason: String,
}

/// Outcome of one intake batch.
#[derive(Debug, Clone, Default)]
pub struct IntakeReport {
    pub staged: Vec<StagedImage>,
    pub rejected: Vec<RejectedImage>,
}
