//! Shared types used across Redraft modules
//!
//! Contains transcript messages, provider chat messages, and tool
//! definitions.

use serde::{Deserialize, Serialize};

/// Who authored a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorRole {
    /// Typed in at the console
    User,
    /// Produced by a registered agent
    Agent,
}

/// One entry in the conversation transcript
///
/// Immutable once appended; `sequence` is assigned by the transcript and is
/// strictly increasing in append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Name of the author ("user" for console input, agent name otherwise)
    pub author: String,
    /// Whether the author is the user or an agent
    pub role: AuthorRole,
    /// Text of the message
    pub content: String,
    /// Position in the transcript, assigned at append time
    pub sequence: u64,
}

impl Message {
    /// Create a user message (sequence assigned on append)
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            author: "user".to_string(),
            role: AuthorRole::User,
            content: content.into(),
            sequence: 0,
        }
    }

    /// Create an agent message (sequence assigned on append)
    pub fn agent(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            role: AuthorRole::Agent,
            content: content.into(),
            sequence: 0,
        }
    }

    /// Whether this message was authored by the given agent
    pub fn is_from(&self, name: &str) -> bool {
        self.role == AuthorRole::Agent && self.author == name
    }
}

/// A message in the provider wire format (system/user/assistant/tool)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Optional tool calls made by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatMessage {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }

}

/// A tool call made by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

/// Definition of a tool that can be called by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Result of executing a tool
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output from the tool
    pub output: String,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user = Message::user("hello");
        assert_eq!(user.role, AuthorRole::User);
        assert_eq!(user.author, "user");

        let agent = Message::agent("Writer", "draft");
        assert_eq!(agent.role, AuthorRole::Agent);
        assert!(agent.is_from("Writer"));
        assert!(!agent.is_from("Critic"));
    }

    #[test]
    fn test_tool_call_arguments() {
        let call = ToolCall::new("request_leave", serde_json::json!({ "email": "a@b.c" }));
        assert_eq!(call.get_string("email").as_deref(), Some("a@b.c"));
        assert_eq!(call.get_string("missing"), None);
    }
}
