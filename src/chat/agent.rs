//! Conversation participants
//!
//! An agent is a named role with fixed instructions. Agents are immutable
//! once created; the controller owns them for the lifetime of a session.

/// What an agent is allowed to do when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Plain chat completion only
    PlainChat,
    /// Chat completion with automatic tool dispatch
    ToolAugmented,
}

/// A named participant in a conversation
#[derive(Debug, Clone)]
pub struct ChatAgent {
    name: String,
    instructions: String,
    capability: Capability,
}

/// Role instructions for the built-in writer agent
pub const WRITER_INSTRUCTIONS: &str = "\
You are a writer. You write engaging and concise blogposts (with title) on \
given topics. You must polish your writing based on the feedback you receive \
and give a refined version. Only return your final work without additional \
comments.";

/// Role instructions for the built-in critic agent
pub const CRITIC_INSTRUCTIONS: &str = "\
You are a critic. You review the work of the writer and provide constructive \
feedback to help improve the quality of the content. Never directly perform \
the correction or provide an example.

RULES:
- Only identify suggestions that are specific and actionable.
- Verify previous suggestions have been addressed.
- Never repeat previous suggestions.
- If no correction is suggested, state that the content is satisfactory and \
answer with the single word: yes.";

impl ChatAgent {
    /// Create a new agent
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        capability: Capability,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            capability,
        }
    }

    /// The built-in writer agent (first responder)
    pub fn writer() -> Self {
        Self::new("Writer", WRITER_INSTRUCTIONS, Capability::ToolAugmented)
    }

    /// The built-in critic agent (reviewer)
    pub fn critic() -> Self {
        Self::new("Critic", CRITIC_INSTRUCTIONS, Capability::PlainChat)
    }

    /// Agent name, unique within a conversation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role-defining instruction string
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Capability set
    pub fn capability(&self) -> Capability {
        self.capability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_agents() {
        let writer = ChatAgent::writer();
        let critic = ChatAgent::critic();

        assert_eq!(writer.name(), "Writer");
        assert_eq!(writer.capability(), Capability::ToolAugmented);
        assert_eq!(critic.name(), "Critic");
        assert_eq!(critic.capability(), Capability::PlainChat);
        assert!(critic.instructions().contains("yes"));
    }
}
