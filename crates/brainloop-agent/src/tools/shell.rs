//! Shell tool: execute commands in a subprocess.
//!
//! # No sandboxing
//!
//! `execute_shell` runs whatever command string the model produces through
//! `sh -c` (`cmd /C` on Windows) with the privileges of this process. There
//! is no allow-list, no deny-list, and no working-directory confinement.
//! The only bound is the hard timeout. Run the agent somewhere you are
//! prepared to have modified.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use brainloop_core::utils::truncate_with_note;
use serde_json::Value;
use tokio::process::Command;
use tracing::{info, warn};

use super::base::{require_string, Tool};
use super::registry::{ParamSpec, ToolKind};

/// Per-stream output limit (characters).
const MAX_STREAM_CHARS: usize = 10_000;

/// Default command timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ─────────────────────────────────────────────
// ExecuteShellTool
// ─────────────────────────────────────────────

/// Execute shell commands in a subprocess.
pub struct ExecuteShellTool {
    /// Working directory for commands.
    working_dir: PathBuf,
    /// Hard command timeout.
    timeout: Duration,
}

impl ExecuteShellTool {
    pub fn new(working_dir: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            working_dir: working_dir.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl Tool for ExecuteShellTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ExecuteShell
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its output. Use for running system commands."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string(
            "command",
            "Shell command to execute (e.g., 'ls -la', 'python script.py')",
        )]
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let command = require_string(&params, "command")?;

        info!(command = %command, cwd = %self.working_dir.display(), "executing shell command");

        let (shell, flag) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        let child = Command::new(shell)
            .arg(flag)
            .arg(&command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to spawn command: {e}"))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| anyhow::anyhow!("Failed to run command: {e}"))?,
            Err(_) => {
                warn!(command = %command, "shell command timed out");
                return Ok(format!(
                    "Error: Command timed out after {} seconds",
                    self.timeout.as_secs()
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Killed by a signal: no exit code.
        let code = output.status.code().unwrap_or(-1);

        let mut result = format!(
            "Command: {command}\nExit Code: {code}\nOutput:\n{}\n",
            truncate_with_note(&stdout, MAX_STREAM_CHARS)
        );
        if !stderr.is_empty() {
            result.push_str(&format!(
                "Errors:\n{}\n",
                truncate_with_note(&stderr, MAX_STREAM_CHARS)
            ));
        }
        Ok(result)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
