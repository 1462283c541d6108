//! Filesystem tools: read, write, list directory.
//!
//! Relative paths resolve against the base directory injected at
//! construction; absolute paths are honored as given. There is no path
//! confinement.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use brainloop_core::utils::resolve_path;
use serde_json::Value;
use tracing::debug;

use super::base::{optional_string, require_string, Tool};
use super::registry::{ParamSpec, ToolKind};

// ─────────────────────────────────────────────
// ReadFileTool
// ─────────────────────────────────────────────

/// Reads and returns the entire content of a file.
pub struct ReadFileTool {
    base_dir: PathBuf,
}

impl ReadFileTool {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ReadFile
    }

    fn description(&self) -> &str {
        "Read the contents of a file. Returns the full text content of the file."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string(
            "path",
            "Path to the file to read (e.g., './workspace/data.txt', 'boot.md')",
        )]
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let path_str = require_string(&params, "path")?;
        let path = resolve_path(&self.base_dir, &path_str);

        if !path.exists() {
            return Ok(format!("Error: File not found: {path_str}"));
        }
        if !path.is_file() {
            anyhow::bail!("Not a file: {path_str}");
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {path_str}: {e}"))?;
        debug!(path = %path.display(), chars = content.len(), "file read");
        Ok(format!("File contents of {path_str}:\n\n{content}"))
    }
}

// ─────────────────────────────────────────────
// WriteFileTool
// ─────────────────────────────────────────────

/// Creates or overwrites a file with the given content.
pub struct WriteFileTool {
    base_dir: PathBuf,
}

impl WriteFileTool {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WriteFile
    }

    fn description(&self) -> &str {
        "Write content to a file. Creates the file if it doesn't exist, overwrites if it does."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string("path", "Path where to write the file"),
            ParamSpec::string("content", "Content to write to the file"),
        ]
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let path_str = require_string(&params, "path")?;
        let content = require_string(&params, "content")?;
        let path = resolve_path(&self.base_dir, &path_str);

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!("Failed to create directory {}: {e}", parent.display())
                })?;
            }
        }

        std::fs::write(&path, &content)
            .map_err(|e| anyhow::anyhow!("Failed to write {path_str}: {e}"))?;
        Ok(format!(
            "Successfully wrote {} characters to {path_str}",
            content.chars().count()
        ))
    }
}

// ─────────────────────────────────────────────
// ListFilesTool
// ─────────────────────────────────────────────

/// Lists the immediate entries of a directory, one name per line.
pub struct ListFilesTool {
    base_dir: PathBuf,
}

impl ListFilesTool {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ListFiles
    }

    fn description(&self) -> &str {
        "List all files and directories in a given directory."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string(
            "directory",
            "Directory to list (e.g., '.', './workspace', './memory')",
        )]
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let dir_str = optional_string(&params, "directory").unwrap_or_else(|| ".".to_string());
        let path = resolve_path(&self.base_dir, &dir_str);

        if !path.exists() {
            return Ok(format!("Error: Directory not found: {dir_str}"));
        }
        if !path.is_dir() {
            anyhow::bail!("Not a directory: {dir_str}");
        }

        let mut names: Vec<String> = std::fs::read_dir(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {dir_str}: {e}"))?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();

        if names.is_empty() {
            Ok("(empty directory)".into())
        } else {
            Ok(names.join("\n"))
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
