//! Chat module - agents, transcript, policies, and the controller
//!
//! Contains the turn-taking and termination logic that drives the
//! writer/critic refinement loop, plus the single-agent assistant session.

pub mod agent;
pub mod assistant;
pub mod controller;
pub mod invoker;
pub mod selection;
pub mod termination;
pub mod transcript;

pub use agent::{Capability, ChatAgent};
pub use assistant::Assistant;
pub use controller::{GroupChat, GroupChatSettings, Phase};
pub use invoker::{AgentInvoker, ModelInvoker};
pub use selection::{AlternatingSelection, PromptSelection, SelectionStrategy};
pub use termination::{PromptTermination, TerminationStrategy, TokenTermination};
pub use transcript::Transcript;
