//! Brainloop CLI: entry point.
//!
//! # Commands
//!
//! - `brainloop [chat] [-m MESSAGE] [--resume]`: single-shot answer or interactive REPL
//! - `brainloop agents`: list the sub-agents recorded so far
//! - `brainloop status`: show configuration and directory status

mod agents;
mod helpers;
mod repl;
mod status;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use brainloop_agent::{load_instructions, AgentLoop, Instructions};
use brainloop_core::config::{load_config, Config};
use brainloop_core::error::ConfigError;
use brainloop_core::{ConversationStore, Session};
use brainloop_providers::{HttpProvider, ProviderError};

use crate::helpers::{ConsoleObserver, Layout};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Brainloop: a tool-calling AI agent in your terminal
#[derive(Parser)]
#[command(name = "brainloop", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ./brainloop.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (single-shot or interactive REPL)
    Chat(ChatArgs),

    /// List sub-agents spawned so far
    Agents,

    /// Show configuration and directory status
    Status,
}

#[derive(Args, Default)]
struct ChatArgs {
    /// Single message (non-interactive). Omit for REPL mode.
    #[arg(short, long)]
    message: Option<String>,

    /// Continue today's saved conversation if there is one
    #[arg(long, default_value_t = false)]
    resume: bool,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,

    /// Mistral API key (overrides config and environment)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command.unwrap_or(Commands::Chat(ChatArgs::default())) {
        Commands::Chat(args) => {
            init_logging(args.logs);
            run_chat(args, config_path).await
        }
        Commands::Agents => {
            init_logging(false);
            agents::run(config_path)
        }
        Commands::Status => status::run(config_path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(provider_err) = e.downcast_ref::<ProviderError>() {
                let (title, details) = helpers::turn_error(provider_err);
                helpers::print_error_box(title, &details);
            } else {
                let title = if e.downcast_ref::<ConfigError>().is_some() {
                    "CONFIGURATION ERROR"
                } else {
                    "INITIALIZATION FAILED"
                };
                helpers::print_error_box(title, &format!("{e:#}"));
            }
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(args: ChatArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path);
    if let Some(key) = args.api_key {
        config.provider.api_key = key;
    }
    config.require_api_key()?;
    config.validate()?;

    let interactive = args.message.is_none();
    if interactive {
        helpers::print_banner();
    }

    let layout = Layout::from_config(&config);
    layout.ensure_dirs()?;
    let instructions = load_instructions(&layout.instructions_file);
    if interactive {
        helpers::report_layout(&layout, &instructions);
    }

    let session = open_session(&layout, &instructions, args.resume);
    let mut agent = build_agent_loop(&config, session)?;

    match args.message {
        Some(msg) => {
            info!("processing single message");
            let response = agent
                .submit(&msg)
                .await
                .context("agent processing failed")?;
            helpers::print_response(&response);
        }
        None => repl::run(agent).await?,
    }

    Ok(())
}

/// Build an `AgentLoop` from the loaded configuration.
fn build_agent_loop(config: &Config, session: Session) -> Result<AgentLoop> {
    let provider = HttpProvider::new(&config.provider, &config.agent.model)
        .context("failed to create LLM client")?;

    Ok(AgentLoop::from_config(
        config,
        Arc::new(provider),
        session,
        Arc::new(ConsoleObserver),
    ))
}

/// Today's saved session when resuming and one exists, otherwise a fresh one.
fn open_session(layout: &Layout, instructions: &Instructions, resume: bool) -> Session {
    if resume {
        let store = ConversationStore::new(&layout.memory_dir);
        match store.load(Local::now().date_naive()) {
            Ok(Some(session)) => {
                info!(messages = session.len(), "resuming today's session");
                return session;
            }
            Ok(None) => info!("no resumable session for today, starting fresh"),
            Err(e) => warn!(error = %e, "failed to load today's session, starting fresh"),
        }
    }
    Session::new(instructions.text.clone())
}

/// Initialize tracing/logging. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("brainloop=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use brainloop_core::Message;
    use tempfile::TempDir;

    #[test]
    fn bare_invocation_is_chat() {
        let cli = Cli::try_parse_from(["brainloop"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn chat_flags_parse() {
        let cli = Cli::try_parse_from([
            "brainloop",
            "chat",
            "-m",
            "hello",
            "--resume",
            "--api-key",
            "sk-test",
            "--config",
            "custom.json",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.json")));
        match cli.command {
            Some(Commands::Chat(args)) => {
                assert_eq!(args.message.as_deref(), Some("hello"));
                assert!(args.resume);
                assert!(!args.logs);
                assert_eq!(args.api_key.as_deref(), Some("sk-test"));
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn agents_and_status_parse() {
        assert!(matches!(
            Cli::try_parse_from(["brainloop", "agents"]).unwrap().command,
            Some(Commands::Agents)
        ));
        assert!(matches!(
            Cli::try_parse_from(["brainloop", "status"]).unwrap().command,
            Some(Commands::Status)
        ));
    }

    #[test]
    fn unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["brainloop", "gateway"]).is_err());
    }

    fn layout_in(tmp: &TempDir) -> Layout {
        let mut config = Config::default();
        config.tools.base_dir = tmp.path().to_string_lossy().to_string();
        Layout::from_config(&config)
    }

    fn instructions(text: &str) -> Instructions {
        Instructions {
            text: text.to_string(),
            source: brainloop_agent::InstructionsSource::BuiltIn,
        }
    }

    #[test]
    fn open_session_fresh_without_resume() {
        let tmp = TempDir::new().unwrap();
        let session = open_session(&layout_in(&tmp), &instructions("be brief"), false);
        assert_eq!(session.len(), 1);
        assert_eq!(session.messages()[0].content(), Some("be brief"));
    }

    #[test]
    fn open_session_resumes_today() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        let store = ConversationStore::new(&layout.memory_dir);

        let mut saved = Session::new("old instructions");
        saved.push(Message::user("hi"));
        saved.push(Message::assistant("hello"));
        store.persist(&saved).unwrap();

        let session = open_session(&layout, &instructions("new instructions"), true);
        assert_eq!(session.len(), 3);
        assert_eq!(session.messages()[0].content(), Some("old instructions"));
    }

    #[test]
    fn open_session_resume_without_snapshot_starts_fresh() {
        let tmp = TempDir::new().unwrap();
        let session = open_session(&layout_in(&tmp), &instructions("fresh"), true);
        assert_eq!(session.len(), 1);
    }
}
