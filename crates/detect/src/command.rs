//! Detector backed by an external program.
//!
//! The program is invoked once per image as
//! `<command...> --weights <w> --conf 0.3 --source <img> --output <annotated>`.
//! It must write the annotated image to `--output` and may print one JSON
//! object per detected region on stdout:
//!
//! ```text
//! {"label": "insulator", "confidence": 0.87, "bbox": [12.0, 40.5, 96.0, 180.0]}
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{DetectError, Detection, Detector, DetectorConfig, Region, DEFAULT_CONFIDENCE};

pub struct CommandDetector {
    config: DetectorConfig,
}

impl CommandDetector {
    /// Validates the config and checks the weights file exists.
    pub fn new(config: DetectorConfig) -> Result<Self, DetectError> {
        config.validate()?;
        if !config.weights_path.is_file() {
            return Err(DetectError::WeightsMissing(config.weights_path.clone()));
        }
        tracing::info!(
            weights = %config.weights_path.display(),
            command = %config.command.join(" "),
            "detector ready"
        );
        Ok(Self { config })
    }

    pub fn weights_path(&self) -> &Path {
        &self.config.weights_path
    }

    fn command_line(&self, source: &Path, output: &Path) -> Command {
        let mut parts = self.config.command.iter();
        let program = parts.next().map(String::as_str).unwrap_or_default();

        let mut cmd = Command::new(program);
        cmd.args(parts)
            .arg("--weights")
            .arg(&self.config.weights_path)
            .arg("--conf")
            .arg(DEFAULT_CONFIDENCE.to_string())
            .arg("--source")
            .arg(source)
            .arg("--output")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Detector for CommandDetector {
    async fn annotate(&self, source: &Path, output: &Path) -> Result<Detection, DetectError> {
        let run = self.command_line(source, output).output();
        let result = tokio::time::timeout(self.config.timeout(), run)
            .await
            .map_err(|_| DetectError::Timeout(self.config.timeout_secs))?
            .map_err(|source| DetectError::Spawn {
                command: self.config.command.join(" "),
                source,
            })?;

        if !result.status.success() {
            return Err(DetectError::Failed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if tokio::fs::metadata(output).await.is_err() {
            return Err(DetectError::MissingOutput(output.to_path_buf()));
        }

        let regions = parse_regions(&String::from_utf8_lossy(&result.stdout));
        tracing::debug!(
            source = %source.display(),
            regions = regions.len(),
            "detection complete"
        );

        Ok(Detection {
            source: PathBuf::from(source),
            annotated: output.to_path_buf(),
            regions,
        })
    }
}

/// Keeps lines that parse as a [`Region`]; anything else (progress output,
/// banners) is skipped.
fn parse_regions(stdout: &str) -> Vec<Region> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}
