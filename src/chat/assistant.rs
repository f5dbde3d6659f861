//! Single-agent assistant session
//!
//! The tool-calling counterpart to the refinement chat: one tool-augmented
//! agent over the same transcript type, one reply per user message.

use std::sync::Arc;

use crate::chat::agent::{Capability, ChatAgent};
use crate::chat::invoker::AgentInvoker;
use crate::chat::transcript::Transcript;
use crate::core::{Message, Result};

/// Instructions for the built-in assistant agent
pub const ASSISTANT_INSTRUCTIONS: &str = "\
You are a helpful assistant. Use the available tools to look up employee \
information, file leave requests, query the election database, and search \
the web. Answer directly when no tool is needed, and never invent data a \
tool could have provided.";

/// A single-agent conversational session with tool support
pub struct Assistant {
    agent: ChatAgent,
    transcript: Transcript,
    invoker: Arc<dyn AgentInvoker>,
}

impl Assistant {
    /// Create an assistant session around the given invoker
    pub fn new(invoker: Arc<dyn AgentInvoker>, max_history: usize) -> Self {
        Self {
            agent: ChatAgent::new(
                "Assistant",
                ASSISTANT_INSTRUCTIONS,
                Capability::ToolAugmented,
            ),
            transcript: Transcript::new(max_history),
            invoker,
        }
    }

    /// Create an assistant with a custom agent definition
    pub fn with_agent(agent: ChatAgent, invoker: Arc<dyn AgentInvoker>, max_history: usize) -> Self {
        Self {
            agent,
            transcript: Transcript::new(max_history),
            invoker,
        }
    }

    /// Submit user text and produce the assistant's reply
    ///
    /// The reply is appended atomically with its generation: a failed
    /// invocation leaves only the user message in the transcript.
    pub async fn ask(&mut self, text: impl Into<String>) -> Result<Message> {
        self.transcript.append(Message::user(text));

        let context: Vec<Message> = self.transcript.messages().cloned().collect();
        let reply = self.invoker.invoke(&self.agent, &context).await?;

        Ok(self
            .transcript
            .append(Message::agent(self.agent.name(), reply)))
    }

    /// Clear the conversation
    pub fn reset(&mut self) {
        self.transcript.clear();
    }

    /// The conversation transcript
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The assistant agent definition
    pub fn agent(&self) -> &ChatAgent {
        &self.agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RedraftError;
    use async_trait::async_trait;

    struct EchoInvoker;

    #[async_trait]
    impl AgentInvoker for EchoInvoker {
        async fn invoke(&self, _agent: &ChatAgent, context: &[Message]) -> Result<String> {
            let last = context.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(format!("echo: {}", last))
        }
    }

    struct FailingInvoker;

    #[async_trait]
    impl AgentInvoker for FailingInvoker {
        async fn invoke(&self, _agent: &ChatAgent, _context: &[Message]) -> Result<String> {
            Err(RedraftError::invocation("backend unavailable"))
        }
    }

    #[tokio::test]
    async fn test_ask_appends_user_and_reply() {
        let mut assistant = Assistant::new(Arc::new(EchoInvoker), 100);
        let reply = assistant.ask("How much leave do I have?").await.unwrap();

        assert_eq!(reply.author, "Assistant");
        assert!(reply.content.contains("How much leave"));
        assert_eq!(assistant.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_reply_is_not_appended() {
        let mut assistant = Assistant::new(Arc::new(FailingInvoker), 100);
        assert!(assistant.ask("hello").await.is_err());

        // The user message stays; no assistant message was appended
        assert_eq!(assistant.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_transcript() {
        let mut assistant = Assistant::new(Arc::new(EchoInvoker), 100);
        assistant.ask("hello").await.unwrap();
        assistant.reset();
        assert!(assistant.transcript().is_empty());
    }
}
