//! Agent loop: the model ↔ tool-calling protocol.
//!
//! One call to [`AgentLoop::submit`] is one turn: append the user text, then
//! alternate between model calls and tool rounds until the model answers in
//! plain text.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use brainloop_core::config::Config;
use brainloop_core::error::StoreError;
use brainloop_core::session::ConversationStore;
use brainloop_core::types::{LlmResponse, Message, Session};
use brainloop_providers::{LlmProvider, LlmRequestConfig, ProviderError};

use crate::events::{AgentEvent, AgentObserver};
use crate::subagent::SubAgentRecord;
use crate::tools::executor::{ToolExecutor, ToolSettings};
use crate::tools::registry::ToolRegistry;

/// Returned when the model produces neither tool calls nor text.
pub const NO_RESPONSE: &str = "No response generated.";

/// Default tool rounds per turn before a text answer is forced.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 20;

// ─────────────────────────────────────────────
// LoopSettings
// ─────────────────────────────────────────────

/// Model selection and per-turn limits.
#[derive(Clone, Debug)]
pub struct LoopSettings {
    pub model: String,
    pub request: LlmRequestConfig,
    /// `0` = unbounded.
    pub max_tool_rounds: usize,
}

impl LoopSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            request: LlmRequestConfig::default(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.agent.model.clone(),
            request: LlmRequestConfig {
                max_tokens: config.agent.max_tokens,
                temperature: config.agent.temperature,
            },
            max_tool_rounds: config.agent.max_tool_rounds,
        }
    }
}

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

/// Owns the session and drives the model ↔ tool protocol.
pub struct AgentLoop {
    /// Model endpoint.
    provider: Arc<dyn LlmProvider>,
    /// Performs tool side effects.
    executor: ToolExecutor,
    /// Declarations offered to the model, fixed at construction.
    registry: ToolRegistry,
    /// Snapshot persistence.
    store: ConversationStore,
    /// Presentation hooks.
    observer: Arc<dyn AgentObserver>,
    /// The conversation. Only this loop mutates it.
    session: Session,
    settings: LoopSettings,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        executor: ToolExecutor,
        store: ConversationStore,
        session: Session,
        settings: LoopSettings,
        observer: Arc<dyn AgentObserver>,
    ) -> Self {
        let registry = executor.registry();

        info!(
            model = %settings.model,
            provider = provider.display_name(),
            tools = registry.len(),
            max_tool_rounds = settings.max_tool_rounds,
            history = session.len(),
            "agent loop initialized"
        );

        Self {
            provider,
            executor,
            registry,
            store,
            observer,
            session,
            settings,
        }
    }

    /// Wire up executor and store from config.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn LlmProvider>,
        session: Session,
        observer: Arc<dyn AgentObserver>,
    ) -> Self {
        let tool_settings = ToolSettings::from_config(config);
        let store = ConversationStore::new(&tool_settings.memory_dir);
        let executor = ToolExecutor::new(&tool_settings, observer.clone());
        Self::new(
            provider,
            executor,
            store,
            session,
            LoopSettings::from_config(config),
            observer,
        )
    }

    /// Run one turn and return the final answer.
    ///
    /// # Errors
    /// A failed model call ends the turn. Everything appended so far stays
    /// in the session, and every recorded tool call already has its result.
    pub async fn submit(&mut self, user_text: &str) -> Result<String, ProviderError> {
        self.session.push(Message::user(user_text));
        self.persist();

        let mut rounds = 0usize;
        loop {
            let response = self.call_model(true).await?;

            if !response.has_tool_calls() {
                return Ok(self.finish(response));
            }

            if self.settings.max_tool_rounds > 0 && rounds >= self.settings.max_tool_rounds {
                warn!(
                    rounds = rounds,
                    requested = response.tool_calls.len(),
                    "tool round limit reached, forcing a text answer"
                );
                let forced = self.call_model(false).await?;
                return Ok(self.finish(forced));
            }

            rounds += 1;
            debug!(round = rounds, calls = response.tool_calls.len(), "tool round");
            self.run_tool_round(&response).await;
        }
    }

    async fn call_model(&self, with_tools: bool) -> Result<LlmResponse, ProviderError> {
        self.observer.on_event(&AgentEvent::Thinking);
        let tools = with_tools.then(|| self.registry.definitions());
        self.provider
            .chat(
                self.session.messages(),
                tools,
                &self.settings.model,
                &self.settings.request,
            )
            .await
    }

    /// Record the tool-call message, then execute each call in request order.
    async fn run_tool_round(&mut self, response: &LlmResponse) {
        self.session.push(response.to_tool_call_message());

        for call in &response.tool_calls {
            let name = &call.function.name;
            let params = decode_arguments(name, &call.function.arguments);

            self.observer.on_event(&AgentEvent::ToolCall {
                name: name.clone(),
                input: Value::Object(params.clone().into_iter().collect()),
            });

            let result = self.executor.execute(name, params).await;

            self.observer.on_event(&AgentEvent::ToolResult {
                name: name.clone(),
                output: result.clone(),
            });
            self.session
                .push(Message::tool_result(&call.id, name, result));
        }
    }

    /// Close the turn with the response's text, or the sentinel if it has none.
    ///
    /// The session is saved either way; the sentinel itself is never stored.
    fn finish(&mut self, response: LlmResponse) -> String {
        let answer = match response.text_content() {
            Some(text) => {
                let text = text.to_string();
                self.session.push(Message::assistant(&text));
                text
            }
            None => {
                warn!(
                    finish_reason = response.finish_reason.as_deref().unwrap_or("?"),
                    "model returned no content"
                );
                NO_RESPONSE.to_string()
            }
        };
        self.persist();
        answer
    }

    fn persist(&self) {
        if let Err(e) = self.store.persist(&self.session) {
            warn!(error = %e, "failed to persist session");
        }
    }

    /// Messages in the session, system message included.
    pub fn message_count(&self) -> usize {
        self.session.len()
    }

    /// Sub-agents recorded so far.
    pub fn sub_agents(&self) -> Result<Vec<SubAgentRecord>, StoreError> {
        self.executor.sub_agents()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

/// Decode tool-call arguments; anything but a JSON object becomes an empty map.
fn decode_arguments(tool: &str, raw: &str) -> HashMap<String, Value> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(tool = tool, error = %e, "malformed tool arguments, using empty mapping");
        HashMap::new()
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testing::RecordingObserver;
    use async_trait::async_trait;
    use brainloop_core::types::{ToolCall, ToolDefinition};
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Scripted model endpoint.
    struct MockProvider {
        /// Responses to return in sequence.
        responses: Mutex<VecDeque<Result<LlmResponse, ProviderError>>>,
        /// (history length, tools offered) per call.
        calls: Mutex<Vec<(usize, bool)>>,
    }

    impl MockProvider {
        fn new(responses: Vec<LlmResponse>) -> Self {
            Self::scripted(responses.into_iter().map(Ok).collect())
        }

        fn scripted(responses: Vec<Result<LlmResponse, ProviderError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(usize, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn chat(
            &self,
            messages: &[Message],
            tools: Option<&[ToolDefinition]>,
            _model: &str,
            _config: &LlmRequestConfig,
        ) -> Result<LlmResponse, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((messages.len(), tools.is_some()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(LlmResponse::text("(no more responses)")))
        }

        fn default_model(&self) -> &str {
            "mock-model"
        }

        fn display_name(&self) -> &str {
            "MockProvider"
        }
    }

    struct Harness {
        tmp: TempDir,
        provider: Arc<MockProvider>,
        observer: Arc<RecordingObserver>,
        agent: AgentLoop,
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn harness_with(provider: MockProvider, max_tool_rounds: usize) -> Harness {
        let tmp = TempDir::new().unwrap();
        let provider = Arc::new(provider);
        let observer = Arc::new(RecordingObserver::default());

        let settings = ToolSettings::new(tmp.path());
        let executor = ToolExecutor::new(&settings, observer.clone());
        let store = ConversationStore::new(&settings.memory_dir);
        let mut loop_settings = LoopSettings::new("mock-model");
        loop_settings.max_tool_rounds = max_tool_rounds;

        let agent = AgentLoop::new(
            provider.clone(),
            executor,
            store,
            Session::started_on(date(), "You are a test agent."),
            loop_settings,
            observer.clone(),
        );
        Harness {
            tmp,
            provider,
            observer,
            agent,
        }
    }

    fn harness(responses: Vec<LlmResponse>) -> Harness {
        harness_with(MockProvider::new(responses), DEFAULT_MAX_TOOL_ROUNDS)
    }

    fn call(id: &str, name: &str, args: &str) -> LlmResponse {
        LlmResponse::tool_calls(vec![ToolCall::new(id, name, args)])
    }

    fn snapshot(h: &Harness) -> Vec<serde_json::Value> {
        let path = h.tmp.path().join("memory/session_20240309.json");
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let mut h = harness(vec![LlmResponse::text("Hi there!")]);

        let answer = h.agent.submit("Hello").await.unwrap();

        assert_eq!(answer, "Hi there!");
        let roles: Vec<&str> = h.agent.session().messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(snapshot(&h).len(), 3);
        assert_eq!(h.provider.calls(), vec![(2, true)]);
    }

    #[tokio::test]
    async fn test_write_then_read_note() {
        let mut h = harness(vec![
            call("call_1", "write_file", r#"{"path": "note.txt", "content": "hello"}"#),
            call("call_2", "read_file", r#"{"path": "note.txt"}"#),
            LlmResponse::text("The note says hello."),
        ]);

        let answer = h
            .agent
            .submit("write a file named note.txt with content 'hello' then read it back")
            .await
            .unwrap();

        assert_eq!(answer, "The note says hello.");
        let messages = h.agent.session().messages();
        assert_eq!(messages.len(), 7);
        let roles: Vec<&str> = messages.iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            vec!["system", "user", "assistant", "tool", "assistant", "tool", "assistant"]
        );
        assert!(messages[3].content().unwrap().contains('5'));
        assert!(messages[5].content().unwrap().contains("hello"));
        assert_eq!(
            std::fs::read_to_string(h.tmp.path().join("note.txt")).unwrap(),
            "hello"
        );
        assert_eq!(snapshot(&h).len(), 7);
    }

    #[tokio::test]
    async fn test_tool_results_follow_request_order() {
        let mut h = harness(vec![
            LlmResponse::tool_calls(vec![
                ToolCall::new("a", "list_files", r#"{"directory": "."}"#),
                ToolCall::new("b", "no_such_tool", "{}"),
                ToolCall::new("c", "read_file", r#"{"path": "missing.txt"}"#),
            ]),
            LlmResponse::text("done"),
        ]);

        h.agent.submit("go").await.unwrap();

        let messages = h.agent.session().messages();
        let requested: Vec<&str> = messages[2].tool_calls().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(requested, vec!["a", "b", "c"]);

        let answered: Vec<(String, String)> = messages[3..6]
            .iter()
            .map(|m| match m {
                Message::Tool {
                    tool_call_id, name, ..
                } => (tool_call_id.clone(), name.clone()),
                other => panic!("expected tool message, got {other:?}"),
            })
            .collect();
        assert_eq!(
            answered,
            vec![
                ("a".to_string(), "list_files".to_string()),
                ("b".to_string(), "no_such_tool".to_string()),
                ("c".to_string(), "read_file".to_string()),
            ]
        );
        assert_eq!(messages[4].content(), Some("Error: Unknown tool 'no_such_tool'"));
        assert_eq!(messages[5].content(), Some("Error: File not found: missing.txt"));
    }

    #[tokio::test]
    async fn test_malformed_arguments_use_empty_mapping() {
        let mut h = harness(vec![
            call("call_x", "read_file", "{path: note.txt"),
            LlmResponse::text("I could not read that."),
        ]);

        let answer = h.agent.submit("read it").await.unwrap();

        assert_eq!(answer, "I could not read that.");
        let tool_msg = &h.agent.session().messages()[3];
        assert!(tool_msg.content().unwrap().starts_with("Error"));
        assert!(tool_msg.content().unwrap().contains("path"));
        assert!(h.observer.events().contains(&AgentEvent::ToolCall {
            name: "read_file".into(),
            input: serde_json::json!({}),
        }));
    }

    #[tokio::test]
    async fn test_spawn_researcher() {
        let mut h = harness(vec![
            call(
                "call_s",
                "spawn_sub_agent",
                r#"{"name": "Researcher", "role": "web research", "tools": ["web_search"]}"#,
            ),
            LlmResponse::text("Researcher is ready."),
        ]);

        h.agent.submit("create a research helper").await.unwrap();

        let agents = h.agent.sub_agents().unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "Researcher");
        assert_eq!(agents[0].role, "web research");
        assert_eq!(agents[0].tools, vec!["web_search"]);
        assert!(h.observer.events().contains(&AgentEvent::SubAgentSpawned {
            name: "Researcher".into(),
            role: "web research".into(),
        }));
    }

    #[tokio::test]
    async fn test_empty_response_returns_sentinel_without_storing_it() {
        let mut h = harness(vec![LlmResponse::default()]);

        let answer = h.agent.submit("hmm").await.unwrap();

        assert_eq!(answer, NO_RESPONSE);
        assert_eq!(h.agent.message_count(), 2);
        let disk = snapshot(&h);
        assert_eq!(disk.len(), 2);
        assert_eq!(disk[1]["role"], "user");
    }

    #[tokio::test]
    async fn test_empty_response_after_tools_saves_rounds() {
        let mut h = harness(vec![call("p1", "list_files", "{}"), LlmResponse::default()]);

        let answer = h.agent.submit("go").await.unwrap();

        assert_eq!(answer, NO_RESPONSE);
        // system, user, tool-call message, its result; no assistant text
        assert_eq!(h.agent.message_count(), 4);
        let disk = snapshot(&h);
        assert_eq!(disk.len(), h.agent.message_count());
        assert_eq!(disk[3]["role"], "tool");
        assert_eq!(disk[3]["tool_call_id"], "p1");
    }

    #[tokio::test]
    async fn test_whitespace_answer_is_stored() {
        let mut h = harness(vec![LlmResponse::text("\n")]);

        let answer = h.agent.submit("say nothing").await.unwrap();

        assert_eq!(answer, "\n");
        assert_eq!(h.agent.message_count(), 3);
        assert_eq!(snapshot(&h)[2]["content"], "\n");
    }

    #[tokio::test]
    async fn test_forced_empty_answer_saves_rounds() {
        let mut h = harness_with(
            MockProvider::new(vec![
                call("f1", "list_files", "{}"),
                call("f2", "list_files", "{}"),
                LlmResponse::default(),
            ]),
            1,
        );

        let answer = h.agent.submit("go").await.unwrap();

        assert_eq!(answer, NO_RESPONSE);
        assert_eq!(h.agent.message_count(), 4);
        assert_eq!(snapshot(&h).len(), 4);
        assert_eq!(h.provider.calls(), vec![(2, true), (4, true), (4, false)]);
    }

    #[tokio::test]
    async fn test_round_limit_forces_answer() {
        let mut h = harness_with(
            MockProvider::new(vec![
                call("r1", "list_files", "{}"),
                call("r2", "list_files", "{}"),
                call("r3", "list_files", "{}"),
                LlmResponse::text("Stopping here."),
            ]),
            2,
        );

        let answer = h.agent.submit("loop forever").await.unwrap();

        assert_eq!(answer, "Stopping here.");
        // system + user + 2 × (call, result) + answer; r3 never recorded
        assert_eq!(h.agent.message_count(), 7);
        assert!(h
            .agent
            .session()
            .messages()
            .iter()
            .all(|m| m.tool_calls().iter().all(|c| c.id != "r3")));
        assert_eq!(
            h.provider.calls(),
            vec![(2, true), (4, true), (6, true), (6, false)]
        );
    }

    #[tokio::test]
    async fn test_unbounded_when_zero() {
        let mut responses: Vec<LlmResponse> = (0..25)
            .map(|i| call(&format!("c{i}"), "list_files", "{}"))
            .collect();
        responses.push(LlmResponse::text("finally"));
        let mut h = harness_with(MockProvider::new(responses), 0);

        assert_eq!(h.agent.submit("go").await.unwrap(), "finally");
        assert_eq!(h.agent.message_count(), 2 + 25 * 2 + 1);
    }

    #[tokio::test]
    async fn test_transport_error_keeps_history_valid() {
        let provider = MockProvider::scripted(vec![
            Ok(call("t1", "list_files", "{}")),
            Err(ProviderError::Status {
                status: 503,
                body: "unavailable".into(),
            }),
            Ok(LlmResponse::text("back online")),
        ]);
        let mut h = harness_with(provider, DEFAULT_MAX_TOOL_ROUNDS);

        let err = h.agent.submit("first").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));

        // user, tool-call message, its result
        assert_eq!(h.agent.message_count(), 4);
        assert_eq!(snapshot(&h).len(), 2);

        let answer = h.agent.submit("again").await.unwrap();
        assert_eq!(answer, "back online");
        assert_eq!(h.agent.message_count(), 6);
    }

    #[tokio::test]
    async fn test_event_sequence() {
        let mut h = harness(vec![
            call("e1", "list_files", "{}"),
            LlmResponse::text("ok"),
        ]);

        h.agent.submit("list").await.unwrap();

        let events = h.observer.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], AgentEvent::Thinking);
        assert!(matches!(&events[1], AgentEvent::ToolCall { name, .. } if name == "list_files"));
        assert!(matches!(&events[2], AgentEvent::ToolResult { name, .. } if name == "list_files"));
        assert_eq!(events[3], AgentEvent::Thinking);
    }

    #[test]
    fn test_decode_arguments() {
        assert!(decode_arguments("t", "").is_empty());
        assert!(decode_arguments("t", "[1, 2]").is_empty());
        assert!(decode_arguments("t", "not json").is_empty());
        let decoded = decode_arguments("t", r#"{"path": "a"}"#);
        assert_eq!(decoded.get("path"), Some(&serde_json::json!("a")));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.agent.max_tokens = Some(512);
        let settings = LoopSettings::from_config(&config);
        assert_eq!(settings.model, "mistral-large-latest");
        assert_eq!(settings.request.max_tokens, Some(512));
        assert_eq!(settings.max_tool_rounds, 20);
    }
}
