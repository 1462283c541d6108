//! Model endpoint layer for Brainloop.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: trait the orchestration loop calls
//! - [`http_provider::HttpProvider`]: client for a Mistral-style `/chat/completions` endpoint
//! - [`error::ProviderError`]: transport, status, and decode failures

pub mod error;
pub mod http_provider;
pub mod traits;

pub use error::ProviderError;
pub use http_provider::HttpProvider;
pub use traits::{LlmProvider, LlmRequestConfig};
