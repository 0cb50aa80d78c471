use serde::{Deserialize, Serialize};

use crate::IntakeError;

/// Limits applied to one upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Maximum number of images per request.
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    /// Maximum size of one image in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

impl IntakeConfig {
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.max_images == 0 {
            return Err(IntakeError::InvalidConfig("max_images must be positive".into()));
        }
        if self.max_image_bytes == 0 {
            return Err(IntakeError::InvalidConfig(
                "max_image_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_images() -> usize {
    16
}

fn default_max_image_bytes() -> usize {
    20 * 1024 * 1024
}
