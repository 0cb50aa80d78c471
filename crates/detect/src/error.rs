use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the detection pass.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid detector config: {0}")]
    InvalidConfig(String),

    #[error("detector weights not found at {}", .0.display())]
    WeightsMissing(PathBuf),

    #[error("failed to launch detector {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("detector exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("detector did not finish within {0}s")]
    Timeout(u64),

    #[error("detector produced no annotated image at {}", .0.display())]
    MissingOutput(PathBuf),
}
