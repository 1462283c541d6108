//! Spawn tool: register a sub-agent.
//!
//! Records a [`SubAgentRecord`] and notifies the presentation layer. No
//! independent loop is started: the record is bookkeeping only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::base::{require_string, string_list, Tool};
use super::registry::{ParamSpec, ToolKind};
use crate::events::{AgentEvent, AgentObserver};
use crate::subagent::{SubAgentRecord, SubAgentStore};

// ─────────────────────────────────────────────
// SpawnSubAgentTool
// ─────────────────────────────────────────────

pub struct SpawnSubAgentTool {
    store: SubAgentStore,
    observer: Arc<dyn AgentObserver>,
}

impl SpawnSubAgentTool {
    pub fn new(store: SubAgentStore, observer: Arc<dyn AgentObserver>) -> Self {
        Self { store, observer }
    }
}

#[async_trait]
impl Tool for SpawnSubAgentTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SpawnSubAgent
    }

    fn description(&self) -> &str {
        "Spawn a specialized sub-agent with a specific role and tools. Use this to delegate specialized tasks."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string(
                "name",
                "Name of the sub-agent (e.g., 'Research Agent', 'Code Analyzer')",
            ),
            ParamSpec::string(
                "role",
                "Role/purpose of the sub-agent (e.g., 'Handles web research and data gathering')",
            ),
            ParamSpec::string_list(
                "tools",
                "List of tool names this agent should have access to",
            ),
        ]
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let name = require_string(&params, "name")?;
        let role = require_string(&params, "role")?;
        let tools = string_list(&params, "tools");

        let summary = format!(
            "Successfully spawned sub-agent '{name}' with role: {role}. It has access to tools: {}",
            tools.join(", ")
        );

        self.store
            .append(SubAgentRecord::new(name.clone(), role.clone(), tools))?;
        self.observer
            .on_event(&AgentEvent::SubAgentSpawned { name, role });

        Ok(summary)
    }
}
