//! CLI module - command-line interface
//!
//! Contains the REPL and console command parsing.

pub mod commands;
pub mod repl;

pub use repl::{Mode, Repl};
