//! Tools module - demo plugin functions for the agent
//!
//! Contains the leave desk, the election database lookup, the web search
//! wrapper, and the registry that dispatches to them.

pub mod leave;
pub mod registry;
pub mod search;
pub mod sql;

pub use registry::ToolRegistry;
