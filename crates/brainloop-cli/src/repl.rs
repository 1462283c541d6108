//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! `exit`, `quit`, `shutdown`, Ctrl-C and Ctrl-D all end the session with a
//! summary.

use std::path::PathBuf;

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::{debug, warn};

use brainloop_agent::AgentLoop;

use crate::helpers::{self, Notice};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "shutdown"];

const PROMPT: &str = "YOU > ";

/// Run the interactive REPL loop until the user leaves.
pub async fn run(mut agent: AgentLoop) -> Result<()> {
    if agent.message_count() > 1 {
        helpers::print_notice(
            &format!("Resumed today's session ({} messages)", agent.message_count()),
            Notice::Memory,
        );
    }
    helpers::print_notice(
        &format!("Model: {} | tools: {}", agent.model(), agent.registry().len()),
        Notice::Info,
    );
    println!("\nReal AI with tool calling active! Type 'exit' to shutdown\n");

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("\nInterrupt received");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if is_exit_command(trimmed) {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let _ = editor.add_history_entry(trimmed);

        debug!(input = trimmed, "processing input");
        match agent.submit(trimmed).await {
            Ok(response) => helpers::print_response(&response),
            Err(e) => {
                let (title, details) = helpers::turn_error(&e);
                helpers::print_error_box(title, &details);
            }
        }
    }

    save_history(&mut editor);
    shutdown(&agent);

    Ok(())
}

/// Print the session summary.
fn shutdown(agent: &AgentLoop) {
    let agents = agent.sub_agents().unwrap_or_else(|e| {
        warn!(error = %e, "failed to read sub-agent registry");
        Vec::new()
    });
    helpers::print_summary(agent.message_count(), &agents);
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    if let Some(path) = history_path() {
        if path.exists() {
            let _ = editor.load_history(&path);
            debug!("loaded REPL history from {}", path.display());
        }
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let Some(path) = history_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// `~/.brainloop/history/cli_history`, when a home directory is known.
fn history_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".brainloop").join("history").join("cli_history"))
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command("Shutdown"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("hello"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn history_path_under_home() {
        if let Some(path) = history_path() {
            assert!(path.to_string_lossy().contains(".brainloop"));
            assert!(path.ends_with("cli_history"));
        }
    }
}
