//! Brainloop Core: shared types, config, and conversation persistence.
//!
//! This crate contains:
//! - **types**: wire messages, tool calls, model responses, the `Session` history
//! - **config**: `brainloop.json` schema + env var overrides
//! - **session**: daily JSON snapshots of the conversation
//! - **error**: error enums shared by the other crates

pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use config::Config;
pub use error::{ConfigError, StoreError};
pub use session::ConversationStore;
pub use types::{LlmResponse, Message, Session, ToolCall, ToolDefinition};
