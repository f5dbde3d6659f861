//! Model invocation collaborator
//!
//! The controller never talks to the model directly; it hands an agent and
//! the conversation context to an [`AgentInvoker`] and gets back the text of
//! one turn. The production implementation drives the Ollama client and,
//! for tool-augmented agents, runs the bounded tool-dispatch loop.

use async_trait::async_trait;
use std::sync::Arc;

use crate::chat::agent::{Capability, ChatAgent};
use crate::core::{ChatMessage, Message, Result, ToolResult};
use crate::llm::{ChatCompletion, GenerateOptions};
use crate::tools::ToolRegistry;

/// Shared token sink, cloneable across streaming calls
type TokenSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Produces the text of one agent turn
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Generate the agent's reply to the conversation so far
    ///
    /// Failures surface to the caller; nothing is appended to any log here.
    async fn invoke(&self, agent: &ChatAgent, context: &[Message]) -> Result<String>;
}

/// Invoker backed by a chat-completion provider and a tool registry
pub struct ModelInvoker {
    llm: Arc<dyn ChatCompletion>,
    model: String,
    tools: Arc<ToolRegistry>,
    max_tool_turns: usize,
    on_token: Option<TokenSink>,
}

impl ModelInvoker {
    /// Create a new invoker
    pub fn new(
        llm: Arc<dyn ChatCompletion>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        max_tool_turns: usize,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            tools,
            max_tool_turns,
            on_token: None,
        }
    }

    /// Stream reply tokens through the given callback
    ///
    /// Tool-dispatch rounds do not stream; their final text is emitted
    /// through the callback in one piece.
    pub fn with_stream_callback(mut self, on_token: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_token = Some(Arc::new(on_token));
        self
    }

    /// Map the transcript into provider messages from this agent's view
    ///
    /// The agent's own past turns become assistant messages; everything else
    /// (user input, other agents) arrives as attributed user messages.
    fn build_messages(&self, agent: &ChatAgent, context: &[Message]) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(agent.instructions())];

        for msg in context {
            if msg.is_from(agent.name()) {
                messages.push(ChatMessage::assistant(msg.content.clone()));
            } else {
                messages.push(ChatMessage::user(format!("{}: {}", msg.author, msg.content)));
            }
        }

        messages
    }

    fn format_observations(observations: &[ToolResult]) -> String {
        let mut output = String::from("## Tool results:\n");
        for (i, obs) in observations.iter().enumerate() {
            output.push_str(&format!(
                "\n### Result {} ({})\n{}\n",
                i + 1,
                obs.tool_name,
                obs.output
            ));
        }
        output
    }

    async fn invoke_plain(&self, agent: &ChatAgent, context: &[Message]) -> Result<String> {
        let messages = self.build_messages(agent, context);
        let options = Some(GenerateOptions {
            temperature: Some(0.7),
            ..Default::default()
        });

        let response = if let Some(ref on_token) = self.on_token {
            let sink = Arc::clone(on_token);
            self.llm
                .chat_stream(
                    &self.model,
                    &messages,
                    options,
                    Box::new(move |token: &str| (sink.as_ref())(token)),
                )
                .await?
        } else {
            self.llm.chat(&self.model, &messages, options).await?
        };

        Ok(response.content)
    }

    async fn invoke_with_tools(&self, agent: &ChatAgent, context: &[Message]) -> Result<String> {
        let base_messages = self.build_messages(agent, context);
        let definitions = self.tools.definitions();

        let mut observations: Vec<ToolResult> = Vec::new();

        for _turn in 0..self.max_tool_turns {
            let mut messages = base_messages.clone();
            if !observations.is_empty() {
                messages.push(ChatMessage::user(Self::format_observations(&observations)));
            }

            let response = self
                .llm
                .chat_with_tools(
                    &self.model,
                    &messages,
                    &definitions,
                    Some(GenerateOptions {
                        // Low temperature for tool selection
                        temperature: Some(0.1),
                        ..Default::default()
                    }),
                )
                .await?;

            if response.tool_calls.is_empty() {
                if let Some(ref on_token) = self.on_token {
                    (on_token.as_ref())(&response.content);
                }
                return Ok(response.content);
            }

            for call in &response.tool_calls {
                match self.tools.execute(call).await {
                    Ok(result) => observations.push(result),
                    Err(e) => observations.push(ToolResult::failure(&call.name, e.to_string())),
                }
            }
        }

        // Dispatch cap reached; ask for an answer from what was observed
        let mut messages = base_messages;
        messages.push(ChatMessage::user(format!(
            "{}\nProvide your answer based on the tool results above.",
            Self::format_observations(&observations)
        )));

        let response = self
            .llm
            .chat(
                &self.model,
                &messages,
                Some(GenerateOptions {
                    temperature: Some(0.7),
                    ..Default::default()
                }),
            )
            .await?;

        if let Some(ref on_token) = self.on_token {
            (on_token.as_ref())(&response.content);
        }
        Ok(response.content)
    }
}

#[async_trait]
impl AgentInvoker for ModelInvoker {
    async fn invoke(&self, agent: &ChatAgent, context: &[Message]) -> Result<String> {
        match agent.capability() {
            Capability::PlainChat => self.invoke_plain(agent, context).await,
            Capability::ToolAugmented => {
                if self.tools.is_empty() {
                    self.invoke_plain(agent, context).await
                } else {
                    self.invoke_with_tools(agent, context).await
                }
            }
        }
    }
}
