//! Custom error types for Redraft
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Redraft operations
#[derive(Error, Debug)]
pub enum RedraftError {
    /// A selection strategy returned a name outside the registered agent set
    #[error("unknown participant '{0}' selected for the next turn")]
    UnknownParticipant(String),

    /// The model invocation collaborator failed for a turn
    #[error("invocation failed: {0}")]
    Invocation(String),

    /// Ollama connection or API errors
    #[error("Ollama error: {0}")]
    Ollama(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Demo database errors
    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Model not available
    #[error("Model '{0}' not available in Ollama. Run: ollama pull {0}")]
    ModelNotFound(String),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Redraft operations
pub type Result<T> = std::result::Result<T, RedraftError>;

impl RedraftError {
    /// Create an Ollama error
    pub fn ollama(msg: impl Into<String>) -> Self {
        Self::Ollama(msg.into())
    }

    /// Create an invocation error
    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::Invocation(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
