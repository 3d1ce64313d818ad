//! LLM error types.

use thiserror::Error;

/// Errors that can occur when calling the completion endpoint.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed (connect, TLS, body read).
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body was not a valid completion payload.
    #[error("malformed completion response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LLMError {
    /// HTTP status of the failed call, when the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            LLMError::Request(e) => e.status().map(|s| s.as_u16()),
            LLMError::Api { status, .. } => Some(*status),
            LLMError::Decode(_) => None,
        }
    }
}
