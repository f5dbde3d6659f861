//! Redraft - console agents over Ollama
//!
//! A two-agent writer/critic refinement loop and a tool-calling assistant,
//! driven from an interactive console.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Chat-completion provider abstraction with Ollama implementation
//! - **Chat**: Agents, transcript, turn-taking and termination policies,
//!   and the conversation controller
//! - **Tools**: Demo plugins (leave desk, election database, web search)
//!   behind a registry
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use redraft::cli::{Mode, Repl};
//! use redraft::core::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut repl = Repl::new(Config::load(), Mode::Refine);
//!     repl.run().await.unwrap();
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use chat::{Assistant, GroupChat};
pub use cli::Repl;
pub use core::{Config, RedraftError, Result};
