//! LLM Provider trait: the seam between the orchestration loop and the network.
//!
//! `HttpProvider` in `http_provider.rs` is the production implementation;
//! tests substitute scripted providers.

use async_trait::async_trait;
use brainloop_core::types::{LlmResponse, Message, ToolDefinition};

use crate::error::ProviderError;

/// Sampling options passed with each model call.
///
/// `None` leaves the choice to the endpoint.
#[derive(Clone, Debug, Default)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: Option<f64>,
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the full conversation history and return the model's next step.
    ///
    /// # Arguments
    /// * `messages`: Conversation history, system message first.
    /// * `tools`   : Tool declarations the model may call. `None` forces a text answer.
    /// * `model`   : Model identifier (e.g. `"mistral-large-latest"`).
    /// * `config`  : Temperature, max_tokens.
    ///
    /// # Errors
    /// Transport failures, non-success statuses, and undecodable bodies are
    /// returned as [`ProviderError`]; they never arrive disguised as content.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
