//! Hosted model access for substation inspection reports.
//!
//! Two concerns live here:
//!
//! - **Credentials** - resolving the provider API key from an ordered chain of
//!   sources (managed secrets file, then environment / `.env`).
//! - **Report requests** - uploading images and issuing one generation call
//!   through the [`ReportModel`] trait. [`GeminiClient`] talks to the hosted
//!   API; [`StaticModel`] is a deterministic stand-in for tests and offline
//!   runs.
//!
//! Every HTTP call carries an explicit timeout and runs under a bounded
//! retry policy (one retry by default) for transient failures.
//!
//! ## Quick example
//!
//! ```no_run
//! use model::{CredentialResolver, GeminiClient, ImageRef, ModelConfig, ReportModel};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let key = CredentialResolver::standard(".secrets/secrets.toml").resolve()?;
//! let client = GeminiClient::new(ModelConfig::default(), key)?;
//! let text = client
//!     .generate("Describe this image.", &[ImageRef::new("tower.png", "image/png")])
//!     .await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod retry;
pub mod types;

mod gemini;
mod serde_millis;
mod stub;

pub use crate::config::{ModelConfig, ModelMode, MAX_RETRIES};
pub use crate::credentials::{
    ApiKey, CredentialResolver, CredentialSource, EnvSource, SecretStore, API_KEY_NAME,
    DEFAULT_SECRETS_PATH,
};
pub use crate::error::{CredentialError, ModelError};
pub use crate::gemini::{GeminiClient, UploadedFile};
pub use crate::retry::{execute_with_retry, RetryConfig, RetryResult};
pub use crate::stub::{StaticModel, SAMPLE_REPORT};
pub use crate::types::{ImageRef, ReportModel};
