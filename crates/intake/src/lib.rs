//! Image intake for substation inspections.
//!
//! Accepts a batch of uploaded files, keeps the JPEG and PNG files that decode
//! cleanly, and writes each one to a uniquely named file inside a
//! per-request [`StagingArea`]. The temporary files are removed as soon as the
//! staging area is dropped.
//!
//! Bad files do not abort the batch: each is recorded as a [`RejectedImage`]
//! and the rest continue. Only an empty result, an oversized batch, or a
//! filesystem error fails the whole call.
//!
//! ```rust
//! use intake::{intake, IntakeConfig, StagingArea, UploadedImage};
//!
//! let area = StagingArea::new().unwrap();
//! let uploads = vec![UploadedImage::new("notes.txt", Some("text/plain".into()), b"hi".to_vec())];
//!
//! // Nothing valid survives, so the batch fails.
//! assert!(intake(uploads, &IntakeConfig::default(), &area).is_err());
//! ```

pub mod config;
pub mod error;
pub mod staging;
pub mod types;
mod validate;

#[cfg(test)]
mod test_support;

pub use crate::config::IntakeConfig;
pub use crate::error::IntakeError;
pub use crate::staging::StagingArea;
pub use crate::types::{
    IntakeReport, MediaType, RejectedImage, StagedImage, UploadedImage, ValidatedImage,
};
pub use crate::validate::validate;

/// Validates and stages every upload, isolating per-file failures.
pub fn intake(
    images: Vec<UploadedImage>,
    cfg: &IntakeConfig,
    area: &StagingArea,
) -> Result<IntakeReport, IntakeError> {
    if images.len() > cfg.max_images {
        return Err(IntakeError::TooManyImages {
            count: images.len(),
            max: cfg.max_images,
        });
    }

    let mut report = IntakeReport::default();
    for (index, upload) in images.into_iter().enumerate() {
        match validate(&upload, cfg) {
            Ok(valid) => {
                let staged = area.stage(index, &valid)?;
                tracing::debug!(
                    index,
                    filename = %staged.filename,
                    width = staged.width,
                    height = staged.height,
                    "image staged"
                );
                report.staged.push(staged);
            }
            Err(err) if err.is_per_file() => {
                tracing::warn!(index, filename = %upload.filename, error = %err, "image rejected");
                report.rejected.push(RejectedImage {
                    filename: upload.filename,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    if report.staged.is_empty() {
        return Err(IntakeError::NoValidImages {
            rejected: report.rejected.len(),
        });
    }

    Ok(report)
}
