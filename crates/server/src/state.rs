use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use std::sync::Arc;
use substation::detect::{CommandDetector, Detector};
use substation::model::{
    CredentialError, CredentialResolver, GeminiClient, ModelMode, ReportModel, StaticModel,
    SAMPLE_REPORT,
};
use substation::Inspector;

/// Whether Generate requests can reach a model.
#[derive(Debug, Clone)]
pub enum ModelStatus {
    Ready(Inspector),
    /// No API key was found at startup; every Generate request is refused.
    MissingCredential(CredentialError),
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Built once at startup and shared across requests
    pub model: ModelStatus,
}

impl ServerState {
    /// Create new server state
    ///
    /// A missing API key is logged once and leaves the server running in a
    /// refusing state. Any other setup failure (bad client config, missing
    /// detector weights) aborts startup.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let detector = if config.detector.enabled {
            let detector = CommandDetector::new(config.detector.clone())?;
            tracing::info!(weights = %detector.weights_path().display(), "detection pass enabled");
            Some(Arc::new(detector) as Arc<dyn Detector>)
        } else {
            None
        };

        let model = match build_model(&config)? {
            Ok(model) => {
                let mut inspector = Inspector::new(model).with_intake(config.intake.clone());
                if let Some(detector) = detector {
                    inspector = inspector.with_detector(detector);
                }
                ModelStatus::Ready(inspector)
            }
            Err(err) => {
                tracing::error!(error = %err, "report generation disabled");
                ModelStatus::MissingCredential(err)
            }
        };

        Ok(Self {
            config: Arc::new(config),
            model,
        })
    }

    /// State around a prebuilt inspector.
    pub fn with_inspector(config: ServerConfig, inspector: Inspector) -> Self {
        Self {
            config: Arc::new(config),
            model: ModelStatus::Ready(inspector),
        }
    }

    /// The inspector, or the blocking error every Generate request gets.
    pub fn inspector(&self) -> ServerResult<&Inspector> {
        match &self.model {
            ModelStatus::Ready(inspector) => Ok(inspector),
            ModelStatus::MissingCredential(err) => {
                Err(ServerError::MissingCredential(err.to_string()))
            }
        }
    }
}

/// The outer error aborts startup; the inner one only disables generation.
fn build_model(
    config: &ServerConfig,
) -> anyhow::Result<Result<Arc<dyn ReportModel>, CredentialError>> {
    match config.model.mode {
        ModelMode::Stub => {
            let text = config
                .model
                .stub_response
                .clone()
                .unwrap_or_else(|| SAMPLE_REPORT.to_string());
            tracing::warn!("stub model in use; reports are canned text");
            Ok(Ok(Arc::new(StaticModel::new(text))))
        }
        ModelMode::Gemini => {
            let key = match CredentialResolver::standard(&config.secrets_path).resolve() {
                Ok(key) => key,
                Err(err) => return Ok(Err(err)),
            };
            let client = GeminiClient::new(config.model.clone(), key)?;
            tracing::info!(model = %config.model.model_name, "hosted model client ready");
            Ok(Ok(Arc::new(client)))
        }
    }
}
