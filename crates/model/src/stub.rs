use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{ImageRef, ModelError, ReportModel};

/// Sample report returned by [`StaticModel::default`].
pub const SAMPLE_REPORT: &str = "## Substation Inspection Summary

**Components Inspected:** Insulators, Towers

| Component   | Quantity Detected | Intact | Damaged |
|-------------|------------------:|-------:|--------:|
| Towers      | 0                 | 0      | 0       |
| Insulators  | 0                 | 0      | 0       |

**Summary of Findings:**
Stub model in use; no images were analyzed.";

/// Deterministic model that always answers with the same text.
///
/// Counts calls so callers can assert whether the model was reached at all.
#[derive(Debug)]
pub struct StaticModel {
    response: String,
    calls: AtomicUsize,
}

impl StaticModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StaticModel {
    fn default() -> Self {
        Self::new(SAMPLE_REPORT)
    }
}

#[async_trait]
impl ReportModel for StaticModel {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, _prompt: &str, _images: &[ImageRef]) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
