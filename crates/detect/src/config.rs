use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DetectError;

/// Settings for the optional detection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Run the detector before the model call.
    #[serde(default)]
    pub enabled: bool,
    /// Program and leading arguments, e.g. `["python3", "detect.py"]`.
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// Pretrained weights file handed to the detector.
    #[serde(default = "default_weights_path")]
    pub weights_path: PathBuf,
    /// Upper bound on one invocation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_command(),
            weights_path: default_weights_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DetectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), DetectError> {
        if self.command.first().map_or(true, |c| c.trim().is_empty()) {
            return Err(DetectError::InvalidConfig("command must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(DetectError::InvalidConfig("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

fn default_command() -> Vec<String> {
    vec!["substation-detect".to_string()]
}

fn default_weights_path() -> PathBuf {
    PathBuf::from("models/substation-detector.pt")
}

fn default_timeout_secs() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let cfg = DetectorConfig::default();
        assert!(!cfg.enabled);
        assert_eq!(cfg.timeout(), Duration::from_secs(120));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_command_is_invalid() {
        let cfg = DetectorConfig {
            command: vec![],
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(DetectError::InvalidConfig(_))));

        let cfg = DetectorConfig {
            command: vec!["  ".into()],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
