//! Client error types.

use thiserror::Error;

use crate::enforcement::Decision;

/// Errors surfaced by the Warden client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid or missing client configuration. Raised at construction.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The API key scope could not be resolved and no explicit scope was
    /// configured, so the backing store cannot be addressed.
    #[error("Failed to resolve API key scope: {0}")]
    ScopeResolution(String),

    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Access denied. Raised only by `check_and_throw`.
    #[error("User {user} is not allowed to perform {action} on {resource}")]
    AccessDenied {
        /// Key of the user that was checked.
        user: String,
        /// The action that was requested.
        action: String,
        /// The resource the action targeted.
        resource: String,
        /// The full decision, for callers that want the explanation.
        decision: Box<Decision>,
    },
}

impl ClientError {
    /// Whether a failed request is worth retrying: transport errors and
    /// server-side (5xx) responses are; everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::RequestFailed(_) => true,
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
