//! Loop events for the presentation layer.
//!
//! The loop and the `spawn_sub_agent` tool report progress through an
//! [`AgentObserver`]. Every callback has a no-op default, so observers only
//! override what they render.

use serde_json::Value;

/// Something observable happened inside a turn.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentEvent {
    /// A model call is about to be made.
    Thinking,
    /// A tool is about to run with these (decoded) inputs.
    ToolCall { name: String, input: Value },
    /// A tool returned this text.
    ToolResult { name: String, output: String },
    /// A sub-agent record was stored.
    SubAgentSpawned { name: String, role: String },
}

/// Receives loop events. Implementations must not block for long: they run
/// inline on the loop's task.
pub trait AgentObserver: Send + Sync {
    fn on_event(&self, _event: &AgentEvent) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl AgentObserver for NoopObserver {}
