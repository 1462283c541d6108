//! Errors raised while talking to the model endpoint.

use thiserror::Error;

/// A model call that produced no usable response.
///
/// Unlike tool failures, these are not fed back to the model: they end the
/// current turn and surface to the caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Error calling LLM: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Error calling LLM: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Error parsing LLM response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ProviderError {
    /// Whether the endpoint rejected the credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, ProviderError::Status { status: 401 | 403, .. })
    }
}
