//! Sub-agent registry: durable bookkeeping for `spawn_sub_agent`.
//!
//! A sub-agent is metadata only: a name, a role, and the tools it would be
//! allowed to use. Nothing is executed. Records are appended to
//! `{memory_dir}/active_agents.json` (pretty-printed JSON array) and never
//! modified or removed.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use brainloop_core::error::StoreError;

/// File name of the registry under the memory root.
pub const AGENTS_FILE: &str = "active_agents.json";

// ─────────────────────────────────────────────
// SubAgentRecord
// ─────────────────────────────────────────────

/// One delegated role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubAgentRecord {
    pub name: String,
    pub role: String,
    pub tools: Vec<String>,
    /// Local time, ISO 8601 without offset.
    pub spawned_at: NaiveDateTime,
}

impl SubAgentRecord {
    /// A record stamped with the current local time.
    pub fn new(name: impl Into<String>, role: impl Into<String>, tools: Vec<String>) -> Self {
        SubAgentRecord {
            name: name.into(),
            role: role.into(),
            tools,
            spawned_at: chrono::Local::now().naive_local(),
        }
    }
}

// ─────────────────────────────────────────────
// SubAgentStore
// ─────────────────────────────────────────────

/// Append-only JSON file of [`SubAgentRecord`]s.
#[derive(Clone, Debug)]
pub struct SubAgentStore {
    path: PathBuf,
}

impl SubAgentStore {
    /// Store rooted at `memory_dir`. Nothing is created until the first append.
    pub fn new(memory_dir: impl AsRef<Path>) -> Self {
        Self {
            path: memory_dir.as_ref().join(AGENTS_FILE),
        }
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, oldest first. A missing file is an empty registry.
    pub fn list(&self) -> Result<Vec<SubAgentRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::json(&self.path, e))
    }

    /// Append one record, creating the memory root if needed.
    pub fn append(&self, record: SubAgentRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let mut records = self.list()?;
        info!(name = %record.name, role = %record.role, "sub-agent registered");
        records.push(record);

        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| StoreError::json(&self.path, e))?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::io(&self.path, e))
    }
}
