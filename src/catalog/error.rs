//! Failure taxonomy for catalog fetches

use thiserror::Error;

/// Message fragments the backend uses when it rejects a key
const AUTH_FAILURE_PATTERNS: &[&str] = &[
    "unauthorized",
    "unauthenticated",
    "not authorized",
    "forbidden",
    "authentication failed",
    "authentication required",
    "invalid api key",
    "invalid key",
    "api key is invalid",
];

/// Errors that can occur when fetching a catalog resource
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// No API key has been configured yet
    #[error("no API key configured")]
    NoCredential,

    /// Timeout, DNS or connection failure
    #[error("catalog request failed: {0}")]
    Transport(String),

    /// The API answered but rejected the request
    #[error("API error: {message}")]
    Api { status: Option<u16>, message: String },

    /// The response body did not have the expected shape
    #[error("failed to decode API response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether this error means the stored key is no longer accepted
    pub fn is_auth_failure(&self) -> bool {
        match self {
            FetchError::Api { status, message } => {
                if matches!(status, Some(401) | Some(403)) {
                    return true;
                }
                let message = message.to_lowercase();
                AUTH_FAILURE_PATTERNS
                    .iter()
                    .any(|pattern| message.contains(pattern))
            }
            _ => false,
        }
    }

    /// Copy shown to the person looking at the widget
    pub fn user_message(&self) -> String {
        match self {
            FetchError::NoCredential => "Please set your API key in the plugin settings".to_string(),
            FetchError::Transport(_) | FetchError::Decode(_) => {
                "The catalog is temporarily unavailable".to_string()
            }
            FetchError::Api { message, .. } => message.clone(),
        }
    }
}
