//! Session snapshot persistence.
//!
//! File format: pretty-printed JSON array of messages in
//! `{memory_dir}/session_{YYYYMMDD}.json`, keyed by the date the session
//! started. Each save rewrites the whole file with the full history.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::StoreError;
use crate::types::{Message, Session};

/// Date format used in snapshot file names.
const FILE_DATE_FORMAT: &str = "%Y%m%d";

// ─────────────────────────────────────────────
// ConversationStore
// ─────────────────────────────────────────────

/// Writes and reads full-history session snapshots under the memory root.
#[derive(Clone, Debug)]
pub struct ConversationStore {
    /// Directory holding the `session_*.json` files.
    memory_dir: PathBuf,
}

impl ConversationStore {
    /// Create a store rooted at `memory_dir`. The directory is created on first save.
    pub fn new(memory_dir: impl Into<PathBuf>) -> Self {
        ConversationStore {
            memory_dir: memory_dir.into(),
        }
    }

    /// The memory root.
    pub fn memory_dir(&self) -> &Path {
        &self.memory_dir
    }

    /// Snapshot file for a session that started on `date`.
    pub fn session_path(&self, date: NaiveDate) -> PathBuf {
        self.memory_dir
            .join(format!("session_{}.json", date.format(FILE_DATE_FORMAT)))
    }

    /// Overwrite the session's snapshot with its full current history.
    pub fn persist(&self, session: &Session) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.memory_dir)
            .map_err(|e| StoreError::io(&self.memory_dir, e))?;

        let path = self.session_path(session.date());
        let json = serde_json::to_string_pretty(session.messages())
            .map_err(|e| StoreError::json(&path, e))?;
        std::fs::write(&path, json).map_err(|e| StoreError::io(&path, e))?;

        debug!(
            messages = session.len(),
            path = %path.display(),
            "session snapshot saved"
        );
        Ok(path)
    }

    /// Load the snapshot for `date`.
    ///
    /// Returns `Ok(None)` when no snapshot exists or when it does not begin
    /// with exactly one system message.
    pub fn load(&self, date: NaiveDate) -> Result<Option<Session>, StoreError> {
        let path = self.session_path(date);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let messages: Vec<Message> =
            serde_json::from_str(&content).map_err(|e| StoreError::json(&path, e))?;

        debug!(
            messages = messages.len(),
            path = %path.display(),
            "session snapshot loaded"
        );
        Ok(Session::from_snapshot(date, messages))
    }

    /// List snapshot files on disk, newest first.
    pub fn list_snapshots(&self) -> Vec<SnapshotSummary> {
        let Ok(entries) = std::fs::read_dir(&self.memory_dir) else {
            return Vec::new();
        };

        let mut summaries: Vec<SnapshotSummary> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let stem = path.file_stem()?.to_str()?;
                let date_part = stem.strip_prefix("session_")?;
                let date = NaiveDate::parse_from_str(date_part, FILE_DATE_FORMAT).ok()?;
                (path.extension()? == "json").then_some(SnapshotSummary { date, path })
            })
            .collect();

        summaries.sort_by(|a, b| b.date.cmp(&a.date));
        summaries
    }
}

/// A snapshot file found on disk.
#[derive(Clone, Debug)]
pub struct SnapshotSummary {
    /// Date the session started.
    pub date: NaiveDate,
    /// Path to the JSON file.
    pub path: PathBuf,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
