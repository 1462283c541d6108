//! `brainloop agents`: list the durable sub-agent records.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use brainloop_agent::{SubAgentRecord, SubAgentStore};
use brainloop_core::config::load_config;

use crate::helpers::Layout;

/// Run the agents command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let layout = Layout::from_config(&config);
    let store = SubAgentStore::new(&layout.memory_dir);
    let agents = store
        .list()
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    println!();
    println!("{}", "🤖 Sub-Agents".cyan().bold());
    println!();

    if agents.is_empty() {
        println!("  {}", "No sub-agents spawned yet.".dimmed());
    }
    for agent in &agents {
        for line in describe(agent) {
            println!("  {line}");
        }
    }
    println!();

    Ok(())
}

/// Plain-text lines for one record.
fn describe(agent: &SubAgentRecord) -> Vec<String> {
    let tools = if agent.tools.is_empty() {
        "(none)".to_string()
    } else {
        agent.tools.join(", ")
    };
    vec![
        format!("• {}: {}", agent.name, agent.role),
        format!("    tools: {tools}"),
        format!("    spawned: {}", agent.spawned_at.format("%Y-%m-%d %H:%M:%S")),
    ]
}
