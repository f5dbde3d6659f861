//! Redraft - console agents over Ollama
//!
//! Main entry point for the CLI application.

use clap::{Parser, ValueEnum};
use redraft::cli::{Mode, Repl};
use redraft::core::{Config, PolicyKind};

/// Redraft - writer/critic refinement and tool-calling assistant
#[derive(Parser, Debug)]
#[command(name = "redraft")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which session to run
    #[arg(long, value_enum, default_value_t = ModeArg::Refine)]
    mode: ModeArg,

    /// Chat model
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// How selection/termination decisions are made
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Cap on agent turns per submission
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Writer/critic refinement loop
    Refine,
    /// Tool-calling assistant
    Assist,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Deterministic rule table
    Rules,
    /// Model-evaluated instruction templates
    Model,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.models.chat = model.clone();
    }

    if let Some(policy) = args.policy {
        config.chat.policy = match policy {
            PolicyArg::Rules => PolicyKind::Rules,
            PolicyArg::Model => PolicyKind::Model,
        };
    }

    if let Some(max_iterations) = args.max_iterations {
        config.chat.max_iterations = max_iterations;
    }

    if args.debug {
        config.debug = true;
    }

    let mode = match args.mode {
        ModeArg::Refine => Mode::Refine,
        ModeArg::Assist => Mode::Assist,
    };

    let mut repl = Repl::new(config, mode);

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        repl.run_once(&prompt).await?;
        return Ok(());
    }

    // Interactive REPL mode
    repl.run().await?;

    Ok(())
}
