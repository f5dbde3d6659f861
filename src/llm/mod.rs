//! LLM module - chat-completion backends
//!
//! Provides the provider abstraction with Ollama as the primary backend.

pub mod ollama;
pub mod traits;

pub use ollama::OllamaClient;
pub use traits::{ChatCompletion, ChatResponse, GenerateOptions, StreamCallback, TokenUsage};
