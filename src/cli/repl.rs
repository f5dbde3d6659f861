//! Interactive console for Redraft
//!
//! Provides the main user interaction loop for both modes: the
//! writer/critic refinement chat and the tool-calling assistant.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::chat::{
    AlternatingSelection, Assistant, ChatAgent, GroupChat, GroupChatSettings, ModelInvoker,
    PromptSelection, PromptTermination, SelectionStrategy, TerminationStrategy, TokenTermination,
};
use crate::cli::commands::{preprocess, CommandResult};
use crate::core::{Config, Message, PolicyKind, Result};
use crate::llm::{ChatCompletion, OllamaClient};
use crate::tools::ToolRegistry;

/// Which session the console drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Writer/critic refinement loop
    Refine,
    /// Single tool-calling assistant
    Assist,
}

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    config: Config,
    mode: Mode,
}

impl Repl {
    /// Create a new REPL
    pub fn new(config: Config, mode: Mode) -> Self {
        Self { config, mode }
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let llm: Arc<dyn ChatCompletion> = Arc::new(OllamaClient::from_config(&self.config));

        print!("Initializing...");
        io::stdout().flush()?;
        match llm.is_model_available(&self.config.models.chat).await {
            Ok(true) => println!(" Ready!\n"),
            Ok(false) => {
                println!(
                    "\n\nModel '{}' not available. Run: ollama pull {}\n",
                    self.config.models.chat, self.config.models.chat
                );
                return Ok(());
            }
            Err(e) => {
                println!("\n\nInitialization error: {}\n", e);
                return Ok(());
            }
        }

        match self.mode {
            Mode::Refine => self.run_refine(llm).await,
            Mode::Assist => self.run_assist(llm).await,
        }
    }

    /// Process a single prompt non-interactively
    pub async fn run_once(&mut self, prompt: &str) -> Result<()> {
        let llm: Arc<dyn ChatCompletion> = Arc::new(OllamaClient::from_config(&self.config));

        match self.mode {
            Mode::Refine => {
                let mut chat = self.build_group_chat(llm)?;
                chat.submit(prompt);
                while let Some(message) = chat.next_turn().await? {
                    render_panel(&message);
                }
            }
            Mode::Assist => {
                let mut assistant = self.build_assistant(llm)?;
                let reply = assistant.ask(prompt).await?;
                if self.config.assistant.streaming {
                    println!();
                } else {
                    println!("{}", reply.content);
                }
            }
        }

        Ok(())
    }

    /// Build the writer/critic session
    fn build_group_chat(&self, llm: Arc<dyn ChatCompletion>) -> Result<GroupChat> {
        let writer = ChatAgent::writer();
        let critic = ChatAgent::critic();
        let first_responder = writer.name().to_string();
        let reviewers = vec![critic.name().to_string()];

        let (selection, termination): (Box<dyn SelectionStrategy>, Box<dyn TerminationStrategy>) =
            match self.config.chat.policy {
                PolicyKind::Rules => (
                    Box::new(AlternatingSelection::new(&first_responder)),
                    Box::new(TokenTermination::new(&self.config.chat.termination_token)),
                ),
                PolicyKind::Model => (
                    Box::new(PromptSelection::new(
                        Arc::clone(&llm),
                        self.config.policy_model(),
                        &first_responder,
                    )),
                    Box::new(PromptTermination::new(
                        Arc::clone(&llm),
                        self.config.policy_model(),
                        &self.config.chat.termination_token,
                    )),
                ),
            };

        // The refinement chat carries no plugins; both agents chat plainly
        let invoker = ModelInvoker::new(
            llm,
            &self.config.models.chat,
            Arc::new(ToolRegistry::new()),
            self.config.assistant.max_tool_turns,
        );

        GroupChat::new(
            vec![writer, critic],
            selection,
            termination,
            Arc::new(invoker),
            GroupChatSettings {
                max_iterations: self.config.chat.max_iterations,
                evaluation_window: self.config.chat.evaluation_window,
                reviewers,
            },
            self.config.chat.max_history,
        )
    }

    /// Build the tool-calling assistant session
    fn build_assistant(&self, llm: Arc<dyn ChatCompletion>) -> Result<Assistant> {
        let registry = Arc::new(ToolRegistry::with_demo_plugins(&self.config)?);

        let mut invoker = ModelInvoker::new(
            llm,
            &self.config.models.chat,
            registry,
            self.config.assistant.max_tool_turns,
        );

        if self.config.assistant.streaming {
            invoker = invoker.with_stream_callback(|token| {
                print!("{}", token);
                let _ = io::stdout().flush();
            });
        }

        Ok(Assistant::new(
            Arc::new(invoker),
            self.config.chat.max_history,
        ))
    }

    async fn run_refine(&self, llm: Arc<dyn ChatCompletion>) -> Result<()> {
        let mut chat = self.build_group_chat(llm)?;

        let stdin = io::stdin();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            match preprocess(&input) {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Reset => {
                    chat.reset();
                    println!("[Conversation has been reset]\n");
                }
                CommandResult::Handled(output) => println!("{}\n", output),
                CommandResult::None => {}
                CommandResult::Submit(text) => {
                    chat.submit(text);

                    loop {
                        match chat.next_turn().await {
                            Ok(Some(message)) => render_panel(&message),
                            Ok(None) => break,
                            Err(e) => {
                                eprintln!("\nError: {}\n", e);
                                break;
                            }
                        }
                    }

                    if chat.is_complete() {
                        println!(
                            "[Round complete after {} turn(s)]\n",
                            chat.iteration_count()
                        );
                    }
                }
            }
        }

        Ok(())
    }

    async fn run_assist(&self, llm: Arc<dyn ChatCompletion>) -> Result<()> {
        let mut assistant = self.build_assistant(llm)?;
        let streaming = self.config.assistant.streaming;

        let stdin = io::stdin();
        loop {
            print!("User > ");
            io::stdout().flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            match preprocess(&input) {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Reset => {
                    assistant.reset();
                    println!("[Conversation has been reset]\n");
                }
                CommandResult::Handled(output) => println!("{}\n", output),
                CommandResult::None => {}
                CommandResult::Submit(text) => {
                    print!("\nAssistant > ");
                    io::stdout().flush()?;

                    match assistant.ask(text).await {
                        Ok(reply) => {
                            if streaming {
                                // Tokens were already printed by the callback
                                println!("\n");
                            } else {
                                println!("{}\n", reply.content);
                            }
                        }
                        Err(e) => eprintln!("\nError: {}\n", e),
                    }
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        println!(
            r#"
──────────────────────────────────────────────────────────
  redraft :: console agents over Ollama
──────────────────────────────────────────────────────────"#
        );
        println!("Ollama: {}", self.config.ollama_url());
        println!("Model:  {}", self.config.models.chat);
        match self.mode {
            Mode::Refine => {
                println!("Mode:   refine (writer/critic loop)");
                println!(
                    "Policy: {:?}, cap {} turns, token '{}'",
                    self.config.chat.policy,
                    self.config.chat.max_iterations,
                    self.config.chat.termination_token
                );
            }
            Mode::Assist => {
                println!("Mode:   assist (tool-calling agent)");
            }
        }
        println!();
        println!("Commands: EXIT, RESET, @<path>, help");
        println!("──────────────────────────────────────────────────────────");
    }
}

/// Render one agent turn as a bordered panel
fn render_panel(message: &Message) {
    let width = 58;
    println!();
    println!("┌{}", "─".repeat(width));
    println!("│ {}", message.author.to_uppercase());
    println!("├{}", "─".repeat(width));
    for line in message.content.lines() {
        println!("│ {}", line);
    }
    println!("└{}", "─".repeat(width));
}
