//! Core module - shared infrastructure for Redraft
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, PolicyKind};
pub use error::{RedraftError, Result};
pub use types::*;
