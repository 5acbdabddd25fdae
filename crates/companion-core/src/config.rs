//! Application Configuration
//!
//! Backend endpoint and credentials. The browser build bakes these in at
//! compile time; without them the app runs against the in-memory backend.

use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout on targets where the HTTP client supports one
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing backend URL")]
    MissingUrl,
    #[error("backend URL must start with http:// or https://: {0}")]
    InvalidUrl(String),
    #[error("missing anonymous API key")]
    MissingAnonKey,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend_url: String,
    pub anon_key: String,
    pub request_timeout: Duration,
    /// Use the in-memory backend and identity provider
    pub demo_mode: bool,
}

impl AppConfig {
    /// Validate explicit values for the hosted backend
    pub fn from_values(backend_url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let backend_url = backend_url.trim();
        let anon_key = anon_key.trim();
        if backend_url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(backend_url.to_string()));
        }
        if anon_key.is_empty() {
            return Err(ConfigError::MissingAnonKey);
        }
        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            demo_mode: false,
        })
    }

    /// Offline configuration backed by the in-memory gateway
    pub fn demo() -> Self {
        Self {
            backend_url: String::new(),
            anon_key: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            demo_mode: true,
        }
    }

    /// Resolve optional build-time values: both present means hosted,
    /// both absent means demo, anything else is an error
    pub fn resolve(backend_url: Option<&str>, anon_key: Option<&str>) -> Result<Self, ConfigError> {
        match (backend_url, anon_key) {
            (None, None) => Ok(Self::demo()),
            (Some(url), Some(key)) => Self::from_values(url, key),
            (None, Some(_)) => Err(ConfigError::MissingUrl),
            (Some(_), None) => Err(ConfigError::MissingAnonKey),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
