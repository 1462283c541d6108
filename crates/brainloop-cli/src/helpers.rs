//! Shared CLI helpers: directory layout, console rendering of loop events,
//! banner and summary boxes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use colored::{ColoredString, Colorize};
use serde_json::Value;

use brainloop_agent::{AgentEvent, AgentObserver, Instructions, InstructionsSource, SubAgentRecord};
use brainloop_core::config::Config;
use brainloop_core::utils::{expand_home, resolve_path, truncate_string};
use brainloop_providers::ProviderError;

/// Width of boxes and separators.
const WIDTH: usize = 80;

/// Tool inputs are cut to this many characters of pretty JSON.
const INPUT_PREVIEW_CHARS: usize = 200;

/// Tool results are cut to this many characters.
const RESULT_PREVIEW_CHARS: usize = 100;

// ─────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────

/// Where the agent keeps its files, resolved from config.
#[derive(Clone, Debug)]
pub struct Layout {
    pub base_dir: PathBuf,
    pub memory_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub instructions_file: PathBuf,
}

impl Layout {
    pub fn from_config(config: &Config) -> Self {
        let base_dir = expand_home(&config.tools.base_dir);
        Self {
            memory_dir: resolve_path(&base_dir, &config.storage.memory_dir),
            workspace_dir: resolve_path(&base_dir, &config.storage.workspace_dir),
            instructions_file: resolve_path(&base_dir, &config.agent.instructions_file),
            base_dir,
        }
    }

    /// Create `memory/` and `workspace/` if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.memory_dir, &self.workspace_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Status lines
// ─────────────────────────────────────────────

/// Kind of a timestamped status line.
#[derive(Clone, Copy, Debug)]
pub enum Notice {
    Info,
    Success,
    Warning,
    Process,
    Memory,
}

impl Notice {
    fn icon(self) -> ColoredString {
        match self {
            Notice::Info => "ℹ".blue(),
            Notice::Success => "✓".green(),
            Notice::Warning => "⚠".yellow(),
            Notice::Process => "⚙".cyan(),
            Notice::Memory => "💾".yellow(),
        }
    }
}

/// Print `[HH:MM:SS] <icon> message`.
pub fn print_notice(message: &str, notice: Notice) {
    let time = Local::now().format("%H:%M:%S").to_string();
    println!("[{}] {} {}", time.white(), notice.icon(), message.bold());
}

/// Report the directories and which instructions are in use.
pub fn report_layout(layout: &Layout, instructions: &Instructions) {
    print_notice("Verifying system integrity...", Notice::Process);
    for (label, dir) in [("memory", &layout.memory_dir), ("workspace", &layout.workspace_dir)] {
        print_notice(
            &format!("Directory verified: {label} ({})", dir.display()),
            Notice::Success,
        );
    }
    match &instructions.source {
        InstructionsSource::File(path) => {
            print_notice(&format!("{} found", path.display()), Notice::Success)
        }
        InstructionsSource::BuiltIn => print_notice(
            &format!(
                "{} not found - will use default",
                layout.instructions_file.display()
            ),
            Notice::Warning,
        ),
    }
    print_notice("System ready", Notice::Success);
    print_separator();
}

// ─────────────────────────────────────────────
// Banner, responses, errors
// ─────────────────────────────────────────────

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}", "═".repeat(WIDTH).cyan());
    println!(
        "{}  v{}",
        "🧠 Brainloop".yellow().bold(),
        version.dimmed()
    );
    println!(
        "{}",
        "Tool-calling agent with sub-agent spawning, powered by Mistral".dimmed()
    );
    println!("{}", "═".repeat(WIDTH).cyan());
    println!();
}

pub fn print_separator() {
    println!("{}", "─".repeat(WIDTH).white());
}

/// Print the final answer of a turn.
pub fn print_response(response: &str) {
    println!();
    println!("{} {response}", "AGENT >".cyan().bold());
    println!();
}

/// Print a red boxed error.
pub fn print_error_box(title: &str, details: &str) {
    let bar = "═".repeat(WIDTH - 4);
    eprintln!();
    eprintln!("{}", format!("╔{bar}╗").red());
    eprintln!("{} {}", "║".red(), format!("ERROR: {title}").red().bold());
    for line in details.lines() {
        eprintln!("{} {}", "║".red(), line.red());
    }
    eprintln!("{}", format!("╚{bar}╝").red());
    eprintln!();
}

/// Error-box title and details for a failed turn.
pub fn turn_error(err: &ProviderError) -> (&'static str, String) {
    if err.is_auth() {
        (
            "INVALID API KEY",
            format!("{err}\nCheck MISTRAL_API_KEY or pass --api-key."),
        )
    } else {
        ("ERROR", err.to_string())
    }
}

/// Print the end-of-session summary.
pub fn print_summary(message_count: usize, agents: &[SubAgentRecord]) {
    print_notice("Initiating shutdown...", Notice::Warning);
    println!();
    println!("{}", "=".repeat(WIDTH).cyan());
    println!("{}", "SESSION SUMMARY".yellow());
    println!("{}", "=".repeat(WIDTH).cyan());
    println!();
    for line in summary_lines(message_count, agents) {
        println!("{line}");
    }
    println!();
    println!("{}", "=".repeat(WIDTH).cyan());
    println!();
}

/// Plain-text body of the session summary.
pub fn summary_lines(message_count: usize, agents: &[SubAgentRecord]) -> Vec<String> {
    let mut lines = vec![
        format!("Total messages: {message_count}"),
        format!("Sub-agents spawned: {}", agents.len()),
    ];
    if !agents.is_empty() {
        lines.push(String::new());
        lines.push("Active Sub-Agents:".to_string());
        lines.extend(agents.iter().map(|a| format!("  • {}: {}", a.name, a.role)));
    }
    lines
}

// ─────────────────────────────────────────────
// Loop events
// ─────────────────────────────────────────────

/// Renders loop events on the terminal.
pub struct ConsoleObserver;

impl AgentObserver for ConsoleObserver {
    fn on_event(&self, event: &AgentEvent) {
        match event {
            AgentEvent::Thinking => {
                println!();
                println!("{}", "🧠 AI is thinking...".magenta());
            }
            AgentEvent::ToolCall { name, input } => {
                println!();
                println!(
                    "{}",
                    format!("╔═══ AI CALLING TOOL: {} ", name.to_uppercase()).green()
                );
                println!("{} {}", "║".green(), "Inputs:".cyan());
                for line in input_preview(input) {
                    println!("{}   {line}", "║".green());
                }
            }
            AgentEvent::ToolResult { output, .. } => {
                println!(
                    "{} {} {}",
                    "║".green(),
                    "Result:".yellow(),
                    result_preview(output)
                );
                println!("{}", format!("╚{}", "═".repeat(WIDTH - 2)).green());
            }
            AgentEvent::SubAgentSpawned { name, role } => {
                println!();
                println!("{}", format!("╭{}╮", "─".repeat(WIDTH - 4)).magenta());
                println!(
                    "{} {} {} {}",
                    "│".magenta(),
                    "⚡ SUB-AGENT SPAWNED:".yellow(),
                    name.white().bold(),
                    format!("({role})").dimmed()
                );
                println!("{}", format!("╰{}╯", "─".repeat(WIDTH - 4)).magenta());
            }
        }
    }
}

/// Pretty JSON of the tool inputs, cut to a fixed budget, one entry per line.
pub fn input_preview(input: &Value) -> Vec<String> {
    let pretty = serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());
    let cut: String = pretty.chars().take(INPUT_PREVIEW_CHARS).collect();
    cut.lines().map(str::to_string).collect()
}

/// Short preview of a tool result, ending in `...` when cut.
pub fn result_preview(output: &str) -> String {
    truncate_string(output, RESULT_PREVIEW_CHARS)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn layout_resolves_against_base_dir() {
        let mut config = Config::default();
        config.tools.base_dir = "/srv/agent".into();
        config.storage.workspace_dir = "/data/ws".into();
        let layout = Layout::from_config(&config);

        assert_eq!(layout.memory_dir, PathBuf::from("/srv/agent/memory"));
        assert_eq!(layout.workspace_dir, PathBuf::from("/data/ws"));
        assert_eq!(layout.instructions_file, PathBuf::from("/srv/agent/boot.md"));
    }

    #[test]
    fn ensure_dirs_creates_both() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.tools.base_dir = tmp.path().to_string_lossy().to_string();
        let layout = Layout::from_config(&config);

        layout.ensure_dirs().unwrap();
        assert!(tmp.path().join("memory").is_dir());
        assert!(tmp.path().join("workspace").is_dir());
        // Second call is a no-op.
        layout.ensure_dirs().unwrap();
    }

    #[test]
    fn input_preview_is_pretty_and_bounded() {
        let lines = input_preview(&json!({ "path": "note.txt" }));
        assert_eq!(lines, vec!["{", "  \"path\": \"note.txt\"", "}"]);

        let long = input_preview(&json!({ "content": "x".repeat(500) }));
        let total: usize = long.iter().map(|l| l.chars().count()).sum();
        assert!(total <= INPUT_PREVIEW_CHARS);
    }

    #[test]
    fn result_preview_cuts_long_output() {
        assert_eq!(result_preview("short"), "short");
        let preview = result_preview(&"y".repeat(300));
        assert_eq!(preview.chars().count(), RESULT_PREVIEW_CHARS);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn turn_error_flags_rejected_key() {
        let (title, details) = turn_error(&ProviderError::Status {
            status: 401,
            body: "Unauthorized".into(),
        });
        assert_eq!(title, "INVALID API KEY");
        assert!(details.contains("HTTP 401"));
        assert!(details.ends_with("Check MISTRAL_API_KEY or pass --api-key."));

        let (title, details) = turn_error(&ProviderError::Status {
            status: 503,
            body: "unavailable".into(),
        });
        assert_eq!(title, "ERROR");
        assert_eq!(details, "Error calling LLM: HTTP 503: unavailable");
    }

    #[test]
    fn summary_without_agents() {
        assert_eq!(
            summary_lines(7, &[]),
            vec!["Total messages: 7", "Sub-agents spawned: 0"]
        );
    }

    #[test]
    fn summary_lists_agents() {
        let agents = vec![
            SubAgentRecord::new("Researcher", "web research", vec!["web_search".into()]),
            SubAgentRecord::new("Scribe", "writes notes", vec![]),
        ];
        let lines = summary_lines(3, &agents);
        assert_eq!(lines[1], "Sub-agents spawned: 2");
        assert_eq!(lines[3], "Active Sub-Agents:");
        assert_eq!(lines[4], "  • Researcher: web research");
        assert_eq!(lines[5], "  • Scribe: writes notes");
    }
}
