//! Web search via the DuckDuckGo Instant Answer API.
//!
//! No API key required. The provider's heterogeneous response (abstract,
//! related topics) is normalized into a JSON array of
//! `{title, snippet, url}` records. A failed request never becomes a Rust
//! error: it is reported as a single `{"error": ...}` record.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::base::{require_string, Tool};
use super::registry::{ParamSpec, ToolKind};

/// DuckDuckGo Instant Answer API endpoint.
pub const DDG_API_URL: &str = "https://api.duckduckgo.com/";

/// User-Agent header.
const USER_AGENT: &str = concat!("brainloop/", env!("CARGO_PKG_VERSION"));

/// Related topics kept per query.
const MAX_RELATED_TOPICS: usize = 5;

/// Related-topic titles are cut to this many characters.
const TITLE_CHARS: usize = 100;

/// One normalized search hit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchRecord {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl SearchRecord {
    /// Placeholder returned when the provider has nothing for the query.
    pub fn no_results() -> Self {
        SearchRecord {
            title: "No results".into(),
            snippet: "No results found for query".into(),
            url: String::new(),
        }
    }
}

// ─────────────────────────────────────────────
// WebSearchTool
// ─────────────────────────────────────────────

/// Searches the web using DuckDuckGo.
pub struct WebSearchTool {
    client: Client,
    endpoint: String,
}

impl WebSearchTool {
    /// Create a search tool against `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    async fn fetch(&self, query: &str) -> anyhow::Result<Value> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {status}");
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    fn description(&self) -> &str {
        "Search the web using DuckDuckGo. Returns a list of search results with titles, snippets, and URLs."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string(
            "query",
            "Search query (e.g., 'Python programming tutorials', 'latest AI news')",
        )]
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let query = require_string(&params, "query")?;
        debug!(query = %query, "web search");

        let output = match self.fetch(&query).await {
            Ok(data) => {
                let mut records = normalize_results(&data);
                if records.is_empty() {
                    records.push(SearchRecord::no_results());
                }
                serde_json::to_string_pretty(&records)?
            }
            Err(e) => {
                warn!(query = %query, error = %e, "web search failed");
                serde_json::to_string_pretty(&json!([{ "error": format!("Search failed: {e}") }]))?
            }
        };
        Ok(output)
    }
}

/// Normalize a DuckDuckGo response into ordered records: the abstract first
/// (if any), then up to five related topics that carry text.
pub fn normalize_results(data: &Value) -> Vec<SearchRecord> {
    let mut records = Vec::new();

    if let Some(text) = data["AbstractText"].as_str().filter(|t| !t.is_empty()) {
        records.push(SearchRecord {
            title: data["Heading"].as_str().unwrap_or("Result").to_string(),
            snippet: text.to_string(),
            url: data["AbstractURL"].as_str().unwrap_or_default().to_string(),
        });
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        for topic in topics.iter().take(MAX_RELATED_TOPICS) {
            // Category groups have "Topics" instead of "Text".
            let Some(text) = topic.get("Text").and_then(Value::as_str) else {
                continue;
            };
            records.push(SearchRecord {
                title: text.chars().take(TITLE_CHARS).collect(),
                snippet: text.to_string(),
                url: topic["FirstURL"].as_str().unwrap_or_default().to_string(),
            });
        }
    }

    records
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
