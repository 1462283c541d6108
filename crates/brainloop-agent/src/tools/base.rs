//! Tool trait: the interface every built-in tool implements.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use super::registry::{ParamSpec, ToolDeclaration, ToolKind};

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every built-in tool implements this trait.
///
/// The executor dispatches on `kind()`, the registry collects
/// `declaration()`, and the loop only ever sees the text `execute()` returns.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which of the closed set of tools this is.
    fn kind(&self) -> ToolKind;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// Parameter contract, in declaration order.
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Execute the tool with the given arguments.
    ///
    /// Returns the tool output as a string (the model reads this).
    /// On failure, return an `Err`; the executor converts it to an error
    /// string for the model.
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String>;

    /// Build the immutable declaration held by the registry.
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new(self.kind(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract an optional `String` param.
pub fn optional_string(params: &HashMap<String, Value>, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Extract a list of strings.
///
/// Accepts a JSON array (non-string items are rendered as JSON) or a single
/// comma-separated string. Absent keys yield an empty list.
pub fn string_list(params: &HashMap<String, Value>, key: &str) -> Vec<String> {
    match params.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}
