//! Substation inspection reports.
//!
//! This crate stitches the stage crates into one Generate action:
//! uploaded photographs are validated and staged ([`intake`]), optionally
//! annotated by a detector ([`detect`]), sent with a fixed prompt to a hosted
//! model ([`model`]), and the Markdown answer is exported ([`report`]).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use substation::{InspectionInterval, Inspector};
//! use substation::intake::UploadedImage;
//! use substation::model::StaticModel;
//!
//! # async fn run(png: Vec<u8>) -> Result<(), substation::InspectionFailure> {
//! let inspector = Inspector::new(Arc::new(StaticModel::new("## Summary\nAll intact")));
//! let today = chrono::Local::now().date_naive();
//!
//! let outcome = inspector
//!     .inspect(
//!         vec![UploadedImage::new("tower.png", Some("image/png".into()), png)],
//!         InspectionInterval::default(),
//!         today,
//!     )
//!     .await?;
//! let md = outcome.report.markdown();
//! assert_eq!(md.bytes, b"## Summary\nAll intact");
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod prompt;
pub mod stage;

pub use detect;
pub use intake;
pub use model;
pub use report;

pub use crate::pipeline::{InspectionOutcome, InspectionReport, Inspector};
pub use crate::prompt::{
    build_prompt, next_inspection, InspectionInterval, PromptError, DEFAULT_INTERVAL_DAYS,
    MAX_INTERVAL_DAYS, MIN_INTERVAL_DAYS,
};
pub use crate::stage::{InspectionStage, StageError, StageTracker};

use detect::DetectError;
use intake::IntakeError;
use model::ModelError;
use thiserror::Error;

/// Errors that can end a Generate action.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("image intake failed: {0}")]
    Intake(#[from] IntakeError),

    #[error("detection failed: {0}")]
    Detection(#[from] DetectError),

    #[error("report request failed: {0}")]
    Model(#[from] ModelError),

    #[error("could not create staging area: {0}")]
    Staging(#[source] std::io::Error),

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// A Generate action that ended early, with every stage it went through.
/// The trail always ends in [`InspectionStage::Failed`].
#[derive(Debug, Error)]
#[error("inspection failed: {error}")]
pub struct InspectionFailure {
    pub error: PipelineError,
    pub stages: Vec<InspectionStage>,
}

impl InspectionFailure {
    /// Last stage reached before the failure.
    pub fn reached(&self) -> InspectionStage {
        self.stages
            .iter()
            .rev()
            .copied()
            .find(|s| *s != InspectionStage::Failed)
            .unwrap_or(InspectionStage::Idle)
    }
}
