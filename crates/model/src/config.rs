use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;
use crate::ModelError;

/// Upper bound on `retry.max_retries`; the generation call is never
/// attempted more than `1 + MAX_RETRIES` times.
pub const MAX_RETRIES: u32 = 3;

/// Which [`ReportModel`](crate::ReportModel) implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelMode {
    /// Hosted Gemini model over HTTPS.
    #[default]
    Gemini,
    /// Deterministic canned response; no network, no credential needed.
    Stub,
}

/// Runtime configuration for the report model client.
///
/// # Example
/// ```
/// use model::{ModelConfig, ModelMode};
///
/// let cfg = ModelConfig {
///     mode: ModelMode::Stub,
///     ..Default::default()
/// };
/// assert_eq!(cfg.model_name, "gemini-1.5-flash");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub mode: ModelMode,
    /// Fixed hosted model version.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Provider base URL; overridden in tests to point at a mock server.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-request timeout for uploads and generation, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Text returned in stub mode. Falls back to a built-in sample report.
    #[serde(default)]
    pub stub_response: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            mode: ModelMode::default(),
            model_name: default_model_name(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry: RetryConfig::default(),
            stub_response: None,
        }
    }
}

impl ModelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.request_timeout_secs == 0 {
            return Err(ModelError::InvalidConfig(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.retry.max_retries > MAX_RETRIES {
            return Err(ModelError::InvalidConfig(format!(
                "retry.max_retries must be at most {MAX_RETRIES}, got {}",
                self.retry.max_retries
            )));
        }
        if reqwest::Url::parse(&self.api_base).is_err() {
            return Err(ModelError::InvalidConfig(format!(
                "api_base is not a valid URL: {}",
                self.api_base
            )));
        }
        Ok(())
    }

    /// True when building a client for this config needs an API key.
    pub fn requires_credential(&self) -> bool {
        self.mode == ModelMode::Gemini
    }
}

fn default_model_name() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}
