//! End-to-end conversation tests
//!
//! Drives the public API with a scripted chat-completion provider, so the
//! whole stack (invoker, policies, controller, tool dispatch) runs without
//! a model backend.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use redraft::chat::{
    AlternatingSelection, Assistant, ChatAgent, GroupChat, GroupChatSettings, ModelInvoker,
    TokenTermination,
};
use redraft::core::{ChatMessage, Config, RedraftError, ToolCall, ToolDefinition};
use redraft::llm::{ChatCompletion, ChatResponse, GenerateOptions, StreamCallback};
use redraft::tools::ToolRegistry;

/// Provider that replays a fixed script of responses and records every
/// message batch it was asked to complete
struct ScriptedProvider {
    replies: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<ChatResponse>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn text(content: &str) -> ChatResponse {
        ChatResponse {
            content: content.to_string(),
            tool_calls: Vec::new(),
            usage: None,
            model: "scripted".to_string(),
        }
    }

    fn tool_call(name: &str, arguments: serde_json::Value) -> ChatResponse {
        ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall::new(name, arguments)],
            usage: None,
            model: "scripted".to_string(),
        }
    }

    fn next(&self, messages: &[ChatMessage]) -> redraft::Result<ChatResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RedraftError::invocation("script exhausted"))
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> Vec<ChatMessage> {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedProvider {
    async fn chat(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _options: Option<GenerateOptions>,
    ) -> redraft::Result<ChatResponse> {
        self.next(messages)
    }

    async fn chat_with_tools(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> redraft::Result<ChatResponse> {
        self.next(messages)
    }

    async fn chat_stream(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _options: Option<GenerateOptions>,
        on_token: StreamCallback,
    ) -> redraft::Result<ChatResponse> {
        let response = self.next(messages)?;
        on_token(&response.content);
        Ok(response)
    }

    async fn is_model_available(&self, _model: &str) -> redraft::Result<bool> {
        Ok(true)
    }

    async fn list_models(&self) -> redraft::Result<Vec<String>> {
        Ok(vec!["scripted".to_string()])
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn refinement_chat(provider: Arc<ScriptedProvider>, max_iterations: usize) -> GroupChat {
    let invoker = ModelInvoker::new(
        provider,
        "scripted",
        Arc::new(ToolRegistry::new()),
        10,
    );

    GroupChat::new(
        vec![ChatAgent::writer(), ChatAgent::critic()],
        Box::new(AlternatingSelection::new("Writer")),
        Box::new(TokenTermination::new("yes")),
        Arc::new(invoker),
        GroupChatSettings {
            max_iterations,
            evaluation_window: 2,
            reviewers: vec!["Critic".to_string()],
        },
        1000,
    )
    .unwrap()
}

#[tokio::test]
async fn writer_then_critic_approval_completes_the_round() {
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::text("Whiskers and Wonder: a blogpost about cats"),
        ScriptedProvider::text("No correction is suggested: yes"),
    ]);
    let mut chat = refinement_chat(Arc::clone(&provider), 10);

    chat.submit("Write about cats");
    let turns = chat.run().await.unwrap();

    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].author, "Writer");
    assert_eq!(turns[1].author, "Critic");
    assert!(chat.is_complete());
    assert_eq!(chat.iteration_count(), 2);

    // The writer was primed with its role and saw the user's topic
    let first = provider.request(0);
    assert_eq!(first[0].role, "system");
    assert!(first[0].content.contains("writer"));
    assert!(first
        .iter()
        .any(|m| m.role == "user" && m.content.contains("Write about cats")));

    // The critic saw the writer's draft attributed by name
    let second = provider.request(1);
    assert!(second
        .iter()
        .any(|m| m.role == "user" && m.content.starts_with("Writer:")));
}

#[tokio::test]
async fn relentless_critic_is_cut_off_at_the_cap() {
    let mut replies = Vec::new();
    for i in 0..10 {
        if i % 2 == 0 {
            replies.push(ScriptedProvider::text(&format!("draft revision {}", i / 2)));
        } else {
            replies.push(ScriptedProvider::text("Shorten the intro."));
        }
    }
    let provider = ScriptedProvider::new(replies);
    let mut chat = refinement_chat(Arc::clone(&provider), 10);

    chat.submit("Write about cats");
    let turns = chat.run().await.unwrap();

    assert_eq!(turns.len(), 10);
    assert!(chat.is_complete());
    assert_eq!(chat.iteration_count(), 10);
    assert_eq!(provider.request_count(), 10);
}

#[tokio::test]
async fn failed_invocation_leaves_no_partial_append() {
    // Script ends after the first turn, so the second invocation fails
    let provider = ScriptedProvider::new(vec![ScriptedProvider::text("a first draft")]);
    let mut chat = refinement_chat(Arc::clone(&provider), 10);

    chat.submit("Write about cats");
    assert!(chat.next_turn().await.unwrap().is_some());
    assert!(chat.next_turn().await.is_err());

    // user message + exactly one agent turn survived
    assert_eq!(chat.transcript().len(), 2);
    assert!(!chat.is_complete());
    assert!(chat.next_turn().await.unwrap().is_none());
}

#[tokio::test]
async fn reset_clears_state_for_a_fresh_round() {
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::text("draft"),
        ScriptedProvider::text("yes"),
        ScriptedProvider::text("another draft"),
        ScriptedProvider::text("yes"),
    ]);
    let mut chat = refinement_chat(Arc::clone(&provider), 10);

    chat.submit("first topic");
    chat.run().await.unwrap();
    chat.reset();
    chat.reset();

    assert!(chat.transcript().is_empty());
    assert_eq!(chat.iteration_count(), 0);

    chat.submit("second topic");
    let turns = chat.run().await.unwrap();
    assert_eq!(turns.len(), 2);
    // Only the fresh round remains in the transcript
    assert_eq!(chat.transcript().len(), 3);
}

#[tokio::test]
async fn assistant_round_trips_a_tool_call() {
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::tool_call("get_current_user", serde_json::json!({})),
        ScriptedProvider::text("You are John Doe and your manager is Jane Doe."),
    ]);

    let config = Config::default();
    let registry = Arc::new(ToolRegistry::with_demo_plugins(&config).unwrap());
    let invoker = ModelInvoker::new(Arc::clone(&provider) as Arc<dyn ChatCompletion>, "scripted", registry, 10);
    let mut assistant = Assistant::new(Arc::new(invoker), 100);

    let reply = assistant.ask("Who am I?").await.unwrap();
    assert!(reply.content.contains("John Doe"));

    // The follow-up request carried the tool output back to the model
    assert_eq!(provider.request_count(), 2);
    let followup = provider.request(1);
    assert!(followup
        .iter()
        .any(|m| m.content.contains("get_current_user") && m.content.contains("john.doe@mail.com")));

    // user message + assistant reply in the transcript, tool rounds unlogged
    assert_eq!(assistant.transcript().len(), 2);
}

#[tokio::test]
async fn assistant_query_against_the_demo_database() {
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::tool_call("list_tables", serde_json::json!({})),
        ScriptedProvider::tool_call(
            "run_query",
            serde_json::json!({ "query": "SELECT name FROM candidates ORDER BY name" }),
        ),
        ScriptedProvider::text("The candidates are Awa Ndiaye, Fatou Diop and Mamadou Sow."),
    ]);

    let config = Config::default();
    let registry = Arc::new(ToolRegistry::with_demo_plugins(&config).unwrap());
    let invoker = ModelInvoker::new(Arc::clone(&provider) as Arc<dyn ChatCompletion>, "scripted", registry, 10);
    let mut assistant = Assistant::new(Arc::new(invoker), 100);

    let reply = assistant.ask("List the candidates").await.unwrap();
    assert!(reply.content.contains("Awa Ndiaye"));

    // Each dispatch round fed the accumulated results back
    let last = provider.request(2);
    assert!(last
        .iter()
        .any(|m| m.content.contains("[DATABASE RESULTS]")));
}
