//! Lifecycle of one Generate action.
//!
//! ```text
//! Idle -> ImagesLoaded -> [DetectionComplete] -> ReportRequested -> ReportReady
//!                                                       any stage -> Failed
//! ```
//!
//! `DetectionComplete` is only visited when a detector is configured.
//! `ReportReady` and `Failed` are terminal.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStage {
    Idle,
    ImagesLoaded,
    DetectionComplete,
    ReportRequested,
    ReportReady,
    Failed,
}

impl InspectionStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, InspectionStage::ReportReady | InspectionStage::Failed)
    }

    fn can_advance_to(self, next: InspectionStage) -> bool {
        use InspectionStage::*;

        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, ImagesLoaded)
                | (ImagesLoaded, DetectionComplete)
                | (ImagesLoaded, ReportRequested)
                | (DetectionComplete, ReportRequested)
                | (ReportRequested, ReportReady)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid stage transition {from:?} -> {to:?}")]
pub struct StageError {
    pub from: InspectionStage,
    pub to: InspectionStage,
}

/// Records every stage the action passes through, in order.
#[derive(Debug, Clone)]
pub struct StageTracker {
    trail: Vec<InspectionStage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            trail: vec![InspectionStage::Idle],
        }
    }

    pub fn current(&self) -> InspectionStage {
        self.trail
            .last()
            .copied()
            .unwrap_or(InspectionStage::Idle)
    }

    /// Moves forward; backward moves and re-entering a terminal stage are refused.
    pub fn advance(&mut self, next: InspectionStage) -> Result<(), StageError> {
        let from = self.current();
        if !from.can_advance_to(next) {
            return Err(StageError { from, to: next });
        }
        tracing::debug!(from = ?from, to = ?next, "inspection stage");
        self.trail.push(next);
        Ok(())
    }

    /// Marks the action failed unless it already reached a terminal stage.
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            let from = self.current();
            tracing::debug!(from = ?from, to = ?InspectionStage::Failed, "inspection stage");
            self.trail.push(InspectionStage::Failed);
        }
    }

    pub fn trail(&self) -> &[InspectionStage] {
        &self.trail
    }

    pub fn into_trail(self) -> Vec<InspectionStage> {
        self.trail
    }
}
