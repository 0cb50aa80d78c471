//! Error types produced by the intake crate.
//!
//! Per-file problems ([`Empty`](IntakeError::Empty),
//! [`UnsupportedType`](IntakeError::UnsupportedType),
//! [`Decode`](IntakeError::Decode), [`TooLarge`](IntakeError::TooLarge)) are
//! isolated by [`intake`](crate::intake): the file is recorded as rejected and
//! the batch continues. The remaining variants abort the batch.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{filename}: file is empty")]
    Empty { filename: String },

    #[error("{filename}: unsupported type {declared}; expected jpg, jpeg or png")]
    UnsupportedType { filename: String, declared: String },

    #[error("{filename}: not a valid image: {reason}")]
    Decode { filename: String, reason: String },

    #[error("{filename}: {size} bytes exceeds the {max} byte limit")]
    TooLarge {
        filename: String,
        size: usize,
        max: usize,
    },

    #[error("too many images: {count} uploaded, at most {max} allowed")]
    TooManyImages { count: usize, max: usize },

    #[error("no valid images to analyze ({rejected} rejected)")]
    NoValidImages { rejected: usize },

    #[error("invalid intake config: {0}")]
    InvalidConfig(String),

    #[error("staging failed: {0}")]
    Io(#[from] io::Error),
}

impl IntakeError {
    /// True for problems confined to a single uploaded file.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            IntakeError::Empty { .. }
                | IntakeError::UnsupportedType { .. }
                | IntakeError::Decode { .. }
                | IntakeError::TooLarge { .. }
        )
    }
}
