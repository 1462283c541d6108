//! Config loader: reads `brainloop.json`, then merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file (`./brainloop.json` unless a path is given)
//! 3. `MISTRAL_API_KEY`, then `BRAINLOOP_<SECTION>__<FIELD>` variables

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "brainloop.json";

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `MISTRAL_API_KEY` → `provider.api_key`
/// - `BRAINLOOP_PROVIDER__API_KEY` → `provider.api_key` (wins over `MISTRAL_API_KEY`)
/// - `BRAINLOOP_PROVIDER__API_BASE` → `provider.api_base`
/// - `BRAINLOOP_AGENT__MODEL` → `agent.model`
/// - `BRAINLOOP_AGENT__MAX_TOOL_ROUNDS` → `agent.max_tool_rounds`
/// - `BRAINLOOP_TOOLS__SHELL_TIMEOUT` → `tools.shell_timeout`
/// - `BRAINLOOP_STORAGE__MEMORY_DIR` → `storage.memory_dir`
/// - `BRAINLOOP_STORAGE__WORKSPACE_DIR` → `storage.workspace_dir`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Override logic with an injectable variable source (tests avoid touching
/// the real process environment).
fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(val) = var("MISTRAL_API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = var("BRAINLOOP_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = var("BRAINLOOP_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if let Some(val) = var("BRAINLOOP_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(n) = parse_var(&var, "BRAINLOOP_AGENT__MAX_TOOL_ROUNDS") {
        config.agent.max_tool_rounds = n;
    }
    if let Some(n) = parse_var(&var, "BRAINLOOP_TOOLS__SHELL_TIMEOUT") {
        config.tools.shell_timeout = n;
    }
    if let Some(val) = var("BRAINLOOP_STORAGE__MEMORY_DIR") {
        config.storage.memory_dir = val;
    }
    if let Some(val) = var("BRAINLOOP_STORAGE__WORKSPACE_DIR") {
        config.storage.workspace_dir = val;
    }

    config
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {key}={raw}: not a valid number");
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
