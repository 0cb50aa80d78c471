//! One Generate action: intake, optional detection, prompt, model call.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use detect::Detector;
use intake::{IntakeConfig, RejectedImage, StagedImage, StagingArea, UploadedImage};
use model::{ImageRef, ReportModel};
use report::{ExportArtifact, ReportError};
use serde::Serialize;

use crate::prompt::{build_prompt, next_inspection, InspectionInterval};
use crate::stage::{InspectionStage, StageTracker};
use crate::{InspectionFailure, PipelineError};

const ANNOTATED_SUFFIX: &str = "annotated";

/// The model's answer for one batch, kept as opaque Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionReport {
    pub text: String,
    pub inspection_date: NaiveDate,
    pub next_inspection_date: NaiveDate,
}

impl InspectionReport {
    pub fn markdown(&self) -> ExportArtifact {
        report::markdown_export(&self.text, self.inspection_date)
    }

    pub fn pdf(&self) -> Result<ExportArtifact, ReportError> {
        report::pdf_export(&self.text, self.inspection_date)
    }

    pub fn html(&self) -> String {
        report::render_html(&self.text)
    }
}

#[derive(Debug, Clone)]
pub struct InspectionOutcome {
    pub report: InspectionReport,
    /// Prompt sent to the model.
    pub prompt: String,
    pub images_analyzed: usize,
    pub rejected: Vec<RejectedImage>,
    pub detection_applied: bool,
    pub stages: Vec<InspectionStage>,
}

/// Orchestrates a Generate action. Holds only shared, immutable collaborators.
#[derive(Clone)]
pub struct Inspector {
    model: Arc<dyn ReportModel>,
    detector: Option<Arc<dyn Detector>>,
    intake: IntakeConfig,
    staging_root: Option<PathBuf>,
}

impl std::fmt::Debug for Inspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspector")
            .field("model", &self.model.model_name())
            .field("detector", &self.detector.is_some())
            .field("intake", &self.intake)
            .field("staging_root", &self.staging_root)
            .finish()
    }
}

struct Generated {
    text: String,
    prompt: String,
    images_analyzed: usize,
    rejected: Vec<RejectedImage>,
    detection_applied: bool,
}

impl Inspector {
    pub fn new(model: Arc<dyn ReportModel>) -> Self {
        Self {
            model,
            detector: None,
            intake: IntakeConfig::default(),
            staging_root: None,
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_intake(mut self, intake: IntakeConfig) -> Self {
        self.intake = intake;
        self
    }

    /// Parent directory for per-request staging areas (system temp by default).
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    pub fn detection_enabled(&self) -> bool {
        self.detector.is_some()
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Runs one Generate action. All temporary files are removed before
    /// this returns, on success and on failure alike.
    pub async fn inspect(
        &self,
        images: Vec<UploadedImage>,
        interval: InspectionInterval,
        today: NaiveDate,
    ) -> Result<InspectionOutcome, InspectionFailure> {
        let mut stages = StageTracker::new();
        let area = match &self.staging_root {
            Some(root) => StagingArea::new_in(root),
            None => StagingArea::new(),
        };
        let area = match area {
            Ok(area) => area,
            Err(err) => return Err(failed(stages, PipelineError::Staging(err))),
        };

        let result = self.run(&mut stages, &area, images, interval, today).await;

        if let Err(err) = area.close() {
            tracing::warn!(error = %err, "failed to remove staging area");
        }

        match result {
            Ok(generated) => {
                tracing::info!(
                    images = generated.images_analyzed,
                    rejected = generated.rejected.len(),
                    detection = generated.detection_applied,
                    report_bytes = generated.text.len(),
                    "inspection report ready"
                );
                Ok(InspectionOutcome {
                    report: InspectionReport {
                        text: generated.text,
                        inspection_date: today,
                        next_inspection_date: next_inspection(today, interval),
                    },
                    prompt: generated.prompt,
                    images_analyzed: generated.images_analyzed,
                    rejected: generated.rejected,
                    detection_applied: generated.detection_applied,
                    stages: stages.into_trail(),
                })
            }
            Err(err) => Err(failed(stages, err)),
        }
    }

    async fn run(
        &self,
        stages: &mut StageTracker,
        area: &StagingArea,
        images: Vec<UploadedImage>,
        interval: InspectionInterval,
        today: NaiveDate,
    ) -> Result<Generated, PipelineError> {
        let intake_report = intake::intake(images, &self.intake, area)?;
        stages.advance(InspectionStage::ImagesLoaded)?;

        let (refs, detection_applied) = match &self.detector {
            Some(detector) => {
                let refs = annotate_all(detector.as_ref(), area, &intake_report.staged).await?;
                stages.advance(InspectionStage::DetectionComplete)?;
                (refs, true)
            }
            None => {
                let refs = intake_report
                    .staged
                    .iter()
                    .map(|s| ImageRef::new(s.path.clone(), s.media_type.mime_type()))
                    .collect();
                (refs, false)
            }
        };

        let prompt = build_prompt(today, interval);
        stages.advance(InspectionStage::ReportRequested)?;
        let text = self.model.generate(&prompt, &refs).await?;
        stages.advance(InspectionStage::ReportReady)?;

        Ok(Generated {
            text,
            prompt,
            images_analyzed: refs.len(),
            rejected: intake_report.rejected,
            detection_applied,
        })
    }
}

fn failed(mut stages: StageTracker, error: PipelineError) -> InspectionFailure {
    stages.fail();
    let stages = stages.into_trail();
    tracing::warn!(error = %error, stages = ?stages, "inspection failed");
    InspectionFailure { error, stages }
}

/// Annotates every staged image in order; the first failure aborts the batch.
async fn annotate_all(
    detector: &dyn Detector,
    area: &StagingArea,
    staged: &[StagedImage],
) -> Result<Vec<ImageRef>, PipelineError> {
    let mut refs = Vec::with_capacity(staged.len());
    for image in staged {
        let output = area.derived_path(image, ANNOTATED_SUFFIX);
        let detection = detector.annotate(&image.path, &output).await?;
        tracing::debug!(
            filename = %image.filename,
            regions = detection.regions.len(),
            "image annotated"
        );
        refs.push(ImageRef::new(detection.annotated, image.media_type.mime_type()));
    }
    Ok(refs)
}
