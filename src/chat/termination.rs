//! Conversation termination
//!
//! Decides whether the refinement round should stop, from a bounded window
//! of the most recent messages. The controller gates evaluation on the
//! reviewer allow-list and enforces the iteration cap separately.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{ChatMessage, Message, Result};
use crate::llm::{ChatCompletion, GenerateOptions};

/// Decides whether the conversation should stop
#[async_trait]
pub trait TerminationStrategy: Send + Sync {
    /// Inspect the window of recent messages (latest last) and decide
    ///
    /// Called only when the latest message was authored by a reviewer.
    async fn should_terminate(&self, recent: &[Message]) -> Result<bool>;
}

/// Token-match termination
///
/// Terminates iff the latest message contains the configured token as a
/// case-insensitive substring. The token present means the reviewer found
/// nothing further to fix.
pub struct TokenTermination {
    token: String,
}

impl TokenTermination {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().to_lowercase(),
        }
    }
}

#[async_trait]
impl TerminationStrategy for TokenTermination {
    async fn should_terminate(&self, recent: &[Message]) -> Result<bool> {
        Ok(recent
            .last()
            .map(|m| m.content.to_lowercase().contains(&self.token))
            .unwrap_or(false))
    }
}

/// Model-backed termination
///
/// Presents the latest message to the policy model with a fixed instruction
/// template; the reply is scanned for the token.
pub struct PromptTermination {
    llm: Arc<dyn ChatCompletion>,
    model: String,
    token: String,
}

impl PromptTermination {
    pub fn new(
        llm: Arc<dyn ChatCompletion>,
        model: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            token: token.into().to_lowercase(),
        }
    }

    fn build_prompt(&self, recent: &[Message]) -> String {
        let last = recent
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        format!(
            "Examine the RESPONSE and determine whether the content has been \
             deemed satisfactory.\n\
             If content is satisfactory, respond with a single word without \
             explanation: {}.\n\
             If specific suggestions are being provided, it is not satisfactory.\n\
             If no correction is suggested, it is satisfactory.\n\n\
             RESPONSE:\n{}",
            self.token, last
        )
    }
}

#[async_trait]
impl TerminationStrategy for PromptTermination {
    async fn should_terminate(&self, recent: &[Message]) -> Result<bool> {
        if recent.is_empty() {
            return Ok(false);
        }

        let messages = vec![ChatMessage::user(self.build_prompt(recent))];

        let response = self
            .llm
            .chat(
                &self.model,
                &messages,
                Some(GenerateOptions {
                    temperature: Some(0.0),
                    ..Default::default()
                }),
            )
            .await?;

        Ok(response.content.to_lowercase().contains(&self.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_match_is_case_insensitive() {
        let strategy = TokenTermination::new("yes");

        let approved = vec![Message::agent("Critic", "No correction is suggested: YES")];
        assert!(strategy.should_terminate(&approved).await.unwrap());

        let rejected = vec![Message::agent("Critic", "Tighten the intro paragraph.")];
        assert!(!strategy.should_terminate(&rejected).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_matches_as_substring() {
        let strategy = TokenTermination::new("yes");
        let recent = vec![Message::agent("Critic", "Yes, the content is satisfactory.")];
        assert!(strategy.should_terminate(&recent).await.unwrap());
    }

    #[tokio::test]
    async fn test_only_latest_message_is_inspected() {
        let strategy = TokenTermination::new("yes");
        let recent = vec![
            Message::agent("Critic", "yes"),
            Message::agent("Writer", "a fresh draft without the token"),
        ];
        assert!(!strategy.should_terminate(&recent).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_window_does_not_terminate() {
        let strategy = TokenTermination::new("yes");
        assert!(!strategy.should_terminate(&[]).await.unwrap());
    }
}
