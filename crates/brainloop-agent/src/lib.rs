//! Brainloop Agent: the orchestration loop and its tools.
//!
//! This crate contains:
//! - **tools**: Tool trait, the closed `ToolKind` set, registry, executor, built-in tools
//! - **subagent**: durable sub-agent records written by `spawn_sub_agent`
//! - **events**: observer hooks for the presentation layer
//! - **instructions**: system-message loader with a built-in default
//! - **agent_loop**: the model ↔ tool-calling loop

pub mod agent_loop;
pub mod events;
pub mod instructions;
pub mod subagent;
pub mod tools;

pub use agent_loop::{AgentLoop, LoopSettings, NO_RESPONSE};
pub use events::{AgentEvent, AgentObserver, NoopObserver};
pub use instructions::{load_instructions, Instructions, InstructionsSource};
pub use subagent::{SubAgentRecord, SubAgentStore};
pub use tools::{Tool, ToolExecutor, ToolKind, ToolRegistry, ToolSettings};
