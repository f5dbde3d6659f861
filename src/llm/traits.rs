//! Chat-completion provider trait
//!
//! Abstracts the model backend so sessions and policies can be exercised
//! against a fake provider in tests.

use async_trait::async_trait;

use crate::core::{ChatMessage, Result, ToolCall, ToolDefinition};

/// Response from a chat-completion provider
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Text content of the response
    pub content: String,
    /// Any tool calls the model wants to make
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Options for generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

/// Callback function for streaming tokens
pub type StreamCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Trait for chat-completion providers
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Generate a response from messages
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: Option<GenerateOptions>,
    ) -> Result<ChatResponse>;

    /// Generate a response with tool definitions
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<ChatResponse>;

    /// Generate a streaming response with a callback for each token
    async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: Option<GenerateOptions>,
        on_token: StreamCallback,
    ) -> Result<ChatResponse>;

    /// Check if a model is available
    async fn is_model_available(&self, model: &str) -> Result<bool>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Get the provider name
    fn name(&self) -> &str;
}
