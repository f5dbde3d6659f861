//! Next-speaker selection
//!
//! Decides which agent speaks next, from the most recent transcript entry.
//! Two built-in strategies: a deterministic rule table and a model-backed
//! variant that evaluates a fixed instruction template.

use async_trait::async_trait;
use std::sync::Arc;

use crate::chat::agent::ChatAgent;
use crate::chat::transcript::Transcript;
use crate::core::{AuthorRole, ChatMessage, RedraftError, Result};
use crate::llm::{ChatCompletion, GenerateOptions};

/// Picks the next agent to speak
#[async_trait]
pub trait SelectionStrategy: Send + Sync {
    /// Return the name of the agent that should produce the next turn
    ///
    /// The transcript is non-empty when this is called. The returned name
    /// must match a registered agent and must never be the author of the
    /// most recent message.
    async fn select_next(&self, transcript: &Transcript, agents: &[ChatAgent]) -> Result<String>;
}

/// Rule-table selection for exactly two agents
///
/// After a user message the configured first responder speaks; after any
/// agent message the other agent speaks.
pub struct AlternatingSelection {
    first_responder: String,
}

impl AlternatingSelection {
    pub fn new(first_responder: impl Into<String>) -> Self {
        Self {
            first_responder: first_responder.into(),
        }
    }
}

fn validate_registered(name: &str, agents: &[ChatAgent]) -> Result<String> {
    agents
        .iter()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .map(|a| a.name().to_string())
        .ok_or_else(|| RedraftError::UnknownParticipant(name.to_string()))
}

#[async_trait]
impl SelectionStrategy for AlternatingSelection {
    async fn select_next(&self, transcript: &Transcript, agents: &[ChatAgent]) -> Result<String> {
        let last = transcript
            .last()
            .ok_or_else(|| RedraftError::Other("selection on an empty transcript".to_string()))?;

        match last.role {
            AuthorRole::User => validate_registered(&self.first_responder, agents),
            AuthorRole::Agent => agents
                .iter()
                .find(|a| a.name() != last.author)
                .map(|a| a.name().to_string())
                .ok_or_else(|| RedraftError::UnknownParticipant(last.author.clone())),
        }
    }
}

/// Model-backed selection
///
/// Presents the most recent message to the policy model with a fixed
/// instruction template and expects a bare participant name back.
pub struct PromptSelection {
    llm: Arc<dyn ChatCompletion>,
    model: String,
    first_responder: String,
}

impl PromptSelection {
    pub fn new(
        llm: Arc<dyn ChatCompletion>,
        model: impl Into<String>,
        first_responder: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            first_responder: first_responder.into(),
        }
    }

    fn build_prompt(&self, transcript: &Transcript, agents: &[ChatAgent]) -> String {
        let participants: Vec<String> = agents
            .iter()
            .map(|a| format!("- {}", a.name()))
            .collect();

        let mut rules = vec![format!(
            "- If RESPONSE is user input, it is {}'s turn.",
            self.first_responder
        )];
        for agent in agents {
            if let Some(other) = agents.iter().find(|a| a.name() != agent.name()) {
                rules.push(format!(
                    "- If RESPONSE is by {}, it is {}'s turn.",
                    agent.name(),
                    other.name()
                ));
            }
        }

        let last = transcript
            .last()
            .map(|m| format!("{}: {}", m.author, m.content))
            .unwrap_or_default();

        format!(
            "Examine the provided RESPONSE and choose the next participant.\n\
             State only the name of the chosen participant without explanation.\n\
             Never choose the participant named in the RESPONSE.\n\n\
             Choose only from these participants:\n{}\n\n\
             Always follow these rules when choosing the next participant:\n{}\n\n\
             RESPONSE:\n{}",
            participants.join("\n"),
            rules.join("\n"),
            last
        )
    }
}

#[async_trait]
impl SelectionStrategy for PromptSelection {
    async fn select_next(&self, transcript: &Transcript, agents: &[ChatAgent]) -> Result<String> {
        if transcript.is_empty() {
            return Err(RedraftError::Other(
                "selection on an empty transcript".to_string(),
            ));
        }

        let prompt = self.build_prompt(transcript, agents);
        let messages = vec![ChatMessage::user(prompt)];

        let response = self
            .llm
            .chat(
                &self.model,
                &messages,
                Some(GenerateOptions {
                    // Low temperature for a deterministic-enough decision
                    temperature: Some(0.0),
                    ..Default::default()
                }),
            )
            .await?;

        let name = response.content.trim();
        validate_registered(name, agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Message;

    fn two_agents() -> Vec<ChatAgent> {
        vec![ChatAgent::writer(), ChatAgent::critic()]
    }

    #[tokio::test]
    async fn test_user_message_selects_first_responder() {
        let agents = two_agents();
        let mut log = Transcript::default();
        log.append(Message::user("Write about cats"));

        let strategy = AlternatingSelection::new("Writer");
        assert_eq!(strategy.select_next(&log, &agents).await.unwrap(), "Writer");
    }

    #[tokio::test]
    async fn test_agents_alternate() {
        let agents = two_agents();
        let strategy = AlternatingSelection::new("Writer");
        let mut log = Transcript::default();

        log.append(Message::user("topic"));
        log.append(Message::agent("Writer", "draft"));
        assert_eq!(strategy.select_next(&log, &agents).await.unwrap(), "Critic");

        log.append(Message::agent("Critic", "feedback"));
        assert_eq!(strategy.select_next(&log, &agents).await.unwrap(), "Writer");
    }

    #[tokio::test]
    async fn test_never_reselects_latest_author() {
        let agents = two_agents();
        let strategy = AlternatingSelection::new("Writer");
        let mut log = Transcript::default();
        log.append(Message::user("topic"));

        for _ in 0..6 {
            let next = strategy.select_next(&log, &agents).await.unwrap();
            assert_ne!(Some(next.as_str()), log.last().map(|m| m.author.as_str()));
            log.append(Message::agent(next, "turn"));
        }
    }

    #[tokio::test]
    async fn test_unknown_first_responder_is_rejected() {
        let agents = two_agents();
        let mut log = Transcript::default();
        log.append(Message::user("topic"));

        let strategy = AlternatingSelection::new("Editor");
        match strategy.select_next(&log, &agents).await {
            Err(RedraftError::UnknownParticipant(name)) => assert_eq!(name, "Editor"),
            other => panic!("expected UnknownParticipant, got {:?}", other.map(|_| ())),
        }
    }
}
