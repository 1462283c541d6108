//! Tool executor: closed dispatch from tool name to side effect.
//!
//! `execute()` never fails: every outcome, including unknown names and tool
//! errors, comes back as text the model can read.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use brainloop_core::config::Config;
use brainloop_core::error::StoreError;
use brainloop_core::utils::{expand_home, resolve_path};
use serde_json::Value;
use tracing::{info, warn};

use super::base::Tool;
use super::filesystem::{ListFilesTool, ReadFileTool, WriteFileTool};
use super::registry::{ToolKind, ToolRegistry};
use super::shell::{ExecuteShellTool, DEFAULT_TIMEOUT_SECS};
use super::spawn::SpawnSubAgentTool;
use super::web::{WebSearchTool, DDG_API_URL};
use crate::events::AgentObserver;
use crate::subagent::{SubAgentRecord, SubAgentStore};

// ─────────────────────────────────────────────
// ToolSettings
// ─────────────────────────────────────────────

/// Where tools operate and how long they may take.
#[derive(Clone, Debug)]
pub struct ToolSettings {
    /// Root for relative paths and the shell's working directory.
    pub base_dir: PathBuf,
    /// Root for the sub-agent registry.
    pub memory_dir: PathBuf,
    /// Hard timeout for `execute_shell`, in seconds.
    pub shell_timeout: u64,
    /// Search provider endpoint.
    pub search_endpoint: String,
    /// Timeout for one search request, in seconds.
    pub search_timeout: u64,
}

impl ToolSettings {
    /// Defaults rooted at `base_dir`, with `memory/` beneath it.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            memory_dir: base_dir.join("memory"),
            base_dir,
            shell_timeout: DEFAULT_TIMEOUT_SECS,
            search_endpoint: DDG_API_URL.to_string(),
            search_timeout: 10,
        }
    }

    /// Settings from the `tools` and `storage` config sections.
    pub fn from_config(config: &Config) -> Self {
        let base_dir = expand_home(&config.tools.base_dir);
        Self {
            memory_dir: resolve_path(&base_dir, &config.storage.memory_dir),
            base_dir,
            shell_timeout: config.tools.shell_timeout,
            search_endpoint: config.tools.search_endpoint.clone(),
            search_timeout: config.tools.search_timeout,
        }
    }
}

// ─────────────────────────────────────────────
// ToolExecutor
// ─────────────────────────────────────────────

/// Owns one instance of every built-in tool.
///
/// Holds no conversation state; the only durable state it touches is the
/// sub-agent registry and whatever files the tools write.
pub struct ToolExecutor {
    read_file: ReadFileTool,
    write_file: WriteFileTool,
    execute_shell: ExecuteShellTool,
    web_search: WebSearchTool,
    list_files: ListFilesTool,
    spawn_sub_agent: SpawnSubAgentTool,
    sub_agents: SubAgentStore,
}

impl ToolExecutor {
    pub fn new(settings: &ToolSettings, observer: Arc<dyn AgentObserver>) -> Self {
        let sub_agents = SubAgentStore::new(&settings.memory_dir);
        Self {
            read_file: ReadFileTool::new(&settings.base_dir),
            write_file: WriteFileTool::new(&settings.base_dir),
            execute_shell: ExecuteShellTool::new(&settings.base_dir, settings.shell_timeout),
            web_search: WebSearchTool::new(&settings.search_endpoint, settings.search_timeout),
            list_files: ListFilesTool::new(&settings.base_dir),
            spawn_sub_agent: SpawnSubAgentTool::new(sub_agents.clone(), observer),
            sub_agents,
        }
    }

    fn tool(&self, kind: ToolKind) -> &dyn Tool {
        match kind {
            ToolKind::ReadFile => &self.read_file,
            ToolKind::WriteFile => &self.write_file,
            ToolKind::ExecuteShell => &self.execute_shell,
            ToolKind::WebSearch => &self.web_search,
            ToolKind::ListFiles => &self.list_files,
            ToolKind::SpawnSubAgent => &self.spawn_sub_agent,
        }
    }

    /// Declarations for every tool, in [`ToolKind::ALL`] order.
    pub fn registry(&self) -> ToolRegistry {
        ToolRegistry::new(
            ToolKind::ALL
                .into_iter()
                .map(|kind| self.tool(kind).declaration())
                .collect(),
        )
    }

    /// Run a tool by wire name.
    ///
    /// Unknown names produce `Error: Unknown tool '<name>'`; tool failures
    /// produce `Error executing <name>: <reason>`.
    pub async fn execute(&self, name: &str, params: HashMap<String, Value>) -> String {
        let Some(kind) = ToolKind::from_name(name) else {
            warn!(tool = name, "unknown tool requested");
            return format!("Error: Unknown tool '{name}'");
        };

        info!(tool = name, "executing tool");
        match self.tool(kind).execute(params).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                format!("Error executing {name}: {e}")
            }
        }
    }

    /// Sub-agent records stored so far.
    pub fn sub_agents(&self) -> Result<Vec<SubAgentRecord>, StoreError> {
        self.sub_agents.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopObserver;
    use serde_json::json;
    use tempfile::TempDir;

    fn executor(tmp: &TempDir) -> ToolExecutor {
        ToolExecutor::new(&ToolSettings::new(tmp.path()), Arc::new(NoopObserver))
    }

    #[test]
    fn test_registry_lists_six_tools_in_order() {
        let tmp = TempDir::new().unwrap();
        let registry = executor(&tmp).registry();
        assert_eq!(
            registry.tool_names(),
            vec![
                "read_file",
                "write_file",
                "execute_shell",
                "web_search",
                "list_files",
                "spawn_sub_agent"
            ]
        );
        assert_eq!(
            registry.get("spawn_sub_agent").unwrap().required(),
            vec!["name", "role", "tools"]
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let tmp = TempDir::new().unwrap();
        let result = executor(&tmp).execute("launch_rockets", HashMap::new()).await;
        assert_eq!(result, "Error: Unknown tool 'launch_rockets'");
    }

    #[tokio::test]
    async fn test_tool_error_becomes_text() {
        let tmp = TempDir::new().unwrap();
        let result = executor(&tmp).execute("read_file", HashMap::new()).await;
        assert_eq!(
            result,
            "Error executing read_file: Missing required parameter: path"
        );
    }

    #[tokio::test]
    async fn test_dispatch_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let exec = executor(&tmp);

        let write = HashMap::from([
            ("path".to_string(), json!("note.txt")),
            ("content".to_string(), json!("hello")),
        ]);
        assert_eq!(
            exec.execute("write_file", write).await,
            "Successfully wrote 5 characters to note.txt"
        );

        let read = HashMap::from([("path".to_string(), json!("note.txt"))]);
        assert_eq!(
            exec.execute("read_file", read).await,
            "File contents of note.txt:\n\nhello"
        );
    }

    #[tokio::test]
    async fn test_spawn_lands_in_memory_dir() {
        let tmp = TempDir::new().unwrap();
        let exec = executor(&tmp);
        let params = HashMap::from([
            ("name".to_string(), json!("Researcher")),
            ("role".to_string(), json!("web research")),
            ("tools".to_string(), json!(["web_search"])),
        ]);
        exec.execute("spawn_sub_agent", params).await;

        assert!(tmp.path().join("memory/active_agents.json").exists());
        assert_eq!(exec.sub_agents().unwrap().len(), 1);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.tools.base_dir = "/srv/agent".into();
        config.tools.shell_timeout = 5;
        let settings = ToolSettings::from_config(&config);
        assert_eq!(settings.base_dir, PathBuf::from("/srv/agent"));
        assert_eq!(settings.memory_dir, PathBuf::from("/srv/agent/memory"));
        assert_eq!(settings.shell_timeout, 5);
    }
}
