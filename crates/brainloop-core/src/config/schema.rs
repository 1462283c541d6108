//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `ToolsConfig`,
//! `StorageConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration, loaded from `brainloop.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub tools: ToolsConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// The API key, or the fatal startup error when none is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        let key = self.provider.api_key.trim();
        if key.is_empty() {
            Err(ConfigError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    /// Reject settings that cannot work: every timeout must be at least one
    /// second.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("tools.shellTimeout", self.tools.shell_timeout),
            ("tools.searchTimeout", self.tools.search_timeout),
            ("provider.requestTimeout", self.provider.request_timeout),
        ];
        for (key, secs) in timeouts {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: "0 (timeouts must be at least 1 second)".to_string(),
                });
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Orchestration loop settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Maximum tokens to generate per response (endpoint default when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (endpoint default when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Tool rounds per turn before a text answer is forced. `0` = unbounded.
    pub max_tool_rounds: usize,
    /// Instructions document loaded into the system message at startup.
    pub instructions_file: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "mistral-large-latest".to_string(),
            max_tokens: None,
            temperature: None,
            max_tool_rounds: 20,
            instructions_file: "boot.md".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// The single chat-completion endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for Bearer authentication.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Client-side timeout for one model call, in seconds.
    pub request_timeout: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.mistral.ai/v1".to_string(),
            request_timeout: 120,
        }
    }
}

impl ProviderConfig {
    /// Whether an API key is set.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Tool execution settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Hard timeout for `execute_shell`, in seconds.
    pub shell_timeout: u64,
    /// Timeout for one `web_search` request, in seconds.
    pub search_timeout: u64,
    /// Search provider endpoint (DuckDuckGo Instant Answer API).
    pub search_endpoint: String,
    /// Directory relative tool paths resolve against. `.` = process directory.
    pub base_dir: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            shell_timeout: 30,
            search_timeout: 10,
            search_endpoint: "https://api.duckduckgo.com/".to_string(),
            base_dir: ".".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Storage
// ─────────────────────────────────────────────

/// Durable storage roots.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Session snapshots and the sub-agent registry.
    pub memory_dir: String,
    /// Conventional home for files the agent creates.
    pub workspace_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            memory_dir: "memory".to_string(),
            workspace_dir: "workspace".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
