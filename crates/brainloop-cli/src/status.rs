//! `brainloop status`: show configuration and directory status.
//!
//! - Shows config path, base/memory/workspace directories, instructions file
//! - Shows model, round bound and whether an API key is set

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use brainloop_core::config::{get_config_path, load_config};
use brainloop_core::ConversationStore;

use crate::helpers::Layout;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let config_file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);
    let layout = Layout::from_config(&config);

    println!();
    println!("{}", "🧠 Brainloop Status".cyan().bold());
    println!();

    print_path("Config:", &config_file);
    print_path("Base dir:", &layout.base_dir);
    print_path("Memory:", &layout.memory_dir);
    print_path("Workspace:", &layout.workspace_dir);
    print_path("Instructions:", &layout.instructions_file);

    println!();
    println!("  {:<18} {}", "Model:".bold(), config.agent.model);
    println!("  {:<18} {}", "API base:".bold(), config.provider.api_base);
    let rounds = match config.agent.max_tool_rounds {
        0 => "unbounded".to_string(),
        n => n.to_string(),
    };
    println!("  {:<18} {}", "Tool rounds:".bold(), rounds.dimmed());

    let key_status = if config.provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured (set MISTRAL_API_KEY)".dimmed())
    };
    println!("  {:<18} {}", "Mistral:".bold(), key_status);

    let snapshots = ConversationStore::new(&layout.memory_dir).list_snapshots();
    match snapshots.first() {
        Some(latest) => println!(
            "  {:<18} {} ({} total)",
            "Sessions:".bold(),
            latest.date,
            snapshots.len()
        ),
        None => println!("  {:<18} {}", "Sessions:".bold(), "none saved".dimmed()),
    }

    println!();

    Ok(())
}

fn print_path(label: &str, path: &Path) {
    println!(
        "  {:<18} {} {}",
        label.bold(),
        path.display(),
        if path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
}
