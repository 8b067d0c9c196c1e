//! Client configuration.
//!
//! Configuration for the Warden client: API credential, service URL,
//! optional explicit scope, timeouts, and the error-handling policy.
//! Values can be loaded from environment variables with sensible defaults
//! for local development.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ClientError;

/// Default Warden API URL.
pub const DEFAULT_API_URL: &str = "https://api.warden.dev";

/// Configuration for the Warden client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key used to authenticate against the Warden service.
    pub token: String,

    /// Base URL of the Warden service.
    pub api_url: String,

    /// Explicit project ID. When set, it is never overwritten by a
    /// fetched scope.
    pub project: Option<String>,

    /// Explicit environment ID. When set, it is never overwritten by a
    /// fetched scope.
    pub environment: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Page size used when listing roles.
    pub per_page: u32,

    /// Error-handling policy: when `true`, upstream failures during a check
    /// surface as errors; when `false` (the default), they degrade to
    /// `allowed: false` decisions so boolean-style callers never need to
    /// handle errors.
    pub raise_errors: bool,

    /// Maximum attempts for idempotent fetches against the service.
    pub max_retries: u32,
}

impl Default for ClientConfig {
    /// Returns a default configuration with an empty token; supply a token
    /// via [`ClientConfig::new`] or `WARDEN_API_KEY` before constructing a
    /// client.
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            project: None,
            environment: None,
            timeout_secs: 30,
            per_page: 100,
            raise_errors: false,
            max_retries: 3,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the given API key and defaults for
    /// everything else.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `WARDEN_API_KEY`: API key (required for a valid client)
    /// - `WARDEN_API_URL`: service URL (default: https://api.warden.dev)
    /// - `WARDEN_PROJECT`: explicit project ID
    /// - `WARDEN_ENVIRONMENT`: explicit environment ID
    /// - `WARDEN_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    /// - `WARDEN_PER_PAGE`: role listing page size (default: 100)
    /// - `WARDEN_RAISE_ERRORS`: surface upstream errors instead of degrading
    ///   to denied decisions (default: false)
    /// - `WARDEN_MAX_RETRIES`: maximum fetch attempts (default: 3)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            token: std::env::var("WARDEN_API_KEY").unwrap_or(default.token),
            api_url: std::env::var("WARDEN_API_URL").unwrap_or(default.api_url),
            project: std::env::var("WARDEN_PROJECT").ok(),
            environment: std::env::var("WARDEN_ENVIRONMENT").ok(),
            timeout_secs: std::env::var("WARDEN_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            per_page: std::env::var("WARDEN_PER_PAGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.per_page),
            raise_errors: std::env::var("WARDEN_RAISE_ERRORS")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.raise_errors),
            max_retries: std::env::var("WARDEN_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_retries),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate that the configuration can authenticate.
    ///
    /// A missing or blank API key is fatal: every operation needs it.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.token.trim().is_empty() {
            return Err(ClientError::Configuration(
                "API key is missing; set WARDEN_API_KEY or pass a token".to_string(),
            ));
        }
        Ok(())
    }
}
