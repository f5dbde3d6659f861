//! Console commands
//!
//! Line-oriented commands handled before input reaches a session:
//! `EXIT`, `RESET` (case-insensitive), `@<path>` to submit file contents,
//! and `help`. Everything else is forwarded as conversation input.

use std::fs;

/// Result of pre-processing one input line
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Forward as conversation input
    Submit(String),
    /// Command was handled, show output
    Handled(String),
    /// Clear the current conversation
    Reset,
    /// Leave the program
    Exit,
    /// Nothing to do
    None,
}

/// Pre-process an input line into a command result
pub fn preprocess(input: &str) -> CommandResult {
    let input = input.trim();

    if input.is_empty() {
        return CommandResult::None;
    }

    if input.eq_ignore_ascii_case("exit") {
        return CommandResult::Exit;
    }

    if input.eq_ignore_ascii_case("reset") {
        return CommandResult::Reset;
    }

    if input.eq_ignore_ascii_case("help") || input == "?" {
        return CommandResult::Handled(help_text());
    }

    if let Some(path) = input.strip_prefix('@') {
        if path.is_empty() {
            return CommandResult::Handled("Usage: @<path>".to_string());
        }
        return match fs::read_to_string(path) {
            Ok(contents) => CommandResult::Submit(contents),
            Err(_) => CommandResult::Handled(format!("Unable to access file: {}", path)),
        };
    }

    CommandResult::Submit(input.to_string())
}

/// Generate help text
fn help_text() -> String {
    r#"Commands:
─────────────────────────────────────────────
  EXIT             Leave the program
  RESET            Clear the conversation
  @<path>          Submit the contents of a file
  help, ?          Show this help message

Anything else is sent to the agents as-is.
─────────────────────────────────────────────"#
        .to_string()
}
