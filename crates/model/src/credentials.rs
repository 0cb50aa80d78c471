//! API key resolution from an ordered list of sources.
//!
//! The standard chain consults a managed secrets file first, then the process
//! environment (falling back to a local `.env` file). The first non-empty
//! value wins; nothing is cached beyond the returned [`ApiKey`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::CredentialError;

/// Key name looked up in every source.
pub const API_KEY_NAME: &str = "GEMINI_API_KEY";

/// Default location of the managed secrets file.
pub const DEFAULT_SECRETS_PATH: &str = ".secrets/secrets.toml";

/// Opaque provider token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps `value`, rejecting empty or whitespace-only strings.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// One place an API key may live.
pub trait CredentialSource: Send + Sync {
    /// Human-readable name used in the "not found" error.
    fn name(&self) -> String;

    /// Raw value stored under `key`, if any.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Managed secrets file (TOML/YAML/JSON, format from the extension).
///
/// A missing file behaves like an empty store. A file that fails to parse is
/// logged and also treated as empty.
#[derive(Debug, Clone)]
pub struct SecretStore {
    path: PathBuf,
}

impl SecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for SecretStore {
    fn name(&self) -> String {
        format!("secrets file {}", self.path.display())
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if !self.path.exists() {
            return None;
        }

        let built = config::Config::builder()
            .add_source(config::File::from(self.path.as_path()).required(false))
            .build();

        match built {
            Ok(store) => store
                .try_deserialize::<HashMap<String, config::Value>>()
                .ok()?
                .into_iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .and_then(|(_, value)| value.into_string().ok()),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "unreadable secrets file");
                None
            }
        }
    }
}

/// Process environment, then an optional dotenv file.
///
/// Variables already present in the environment take precedence over the
/// dotenv file, matching how dotenv loaders behave. The file is read without
/// mutating the process environment.
#[derive(Debug, Clone)]
pub struct EnvSource {
    dotenv_path: Option<PathBuf>,
}

impl EnvSource {
    pub fn new(dotenv_path: Option<PathBuf>) -> Self {
        Self { dotenv_path }
    }

    fn lookup_dotenv(&self, key: &str) -> Option<String> {
        let iter = match &self.dotenv_path {
            Some(path) => dotenvy::from_path_iter(path).ok()?,
            None => dotenvy::dotenv_iter().ok()?,
        };

        iter.filter_map(Result::ok)
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CredentialSource for EnvSource {
    fn name(&self) -> String {
        match &self.dotenv_path {
            Some(path) => format!("environment or {}", path.display()),
            None => "environment or .env".to_string(),
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) if !value.trim().is_empty() => Some(value),
            _ => self.lookup_dotenv(key),
        }
    }
}

/// Ordered chain of [`CredentialSource`]s for one key.
pub struct CredentialResolver {
    key: String,
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialResolver {
    /// Empty chain for `key`; add sources with [`with_source`](Self::with_source).
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sources: Vec::new(),
        }
    }

    /// Secrets file, then environment / `.env`, for [`API_KEY_NAME`].
    pub fn standard(secrets_path: impl Into<PathBuf>) -> Self {
        Self::new(API_KEY_NAME)
            .with_source(SecretStore::new(secrets_path))
            .with_source(EnvSource::default())
    }

    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// First non-empty value across the sources, in order.
    pub fn resolve(&self) -> Result<ApiKey, CredentialError> {
        for source in &self.sources {
            if let Some(key) = source.lookup(&self.key).and_then(ApiKey::new) {
                tracing::debug!(source = %source.name(), "API key resolved");
                return Ok(key);
            }
        }

        Err(CredentialError::Missing {
            key: self.key.clone(),
            searched: self.sources.iter().map(|s| s.name()).collect(),
        })
    }
}
