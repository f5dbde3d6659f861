//! Conversation controller
//!
//! Drives repeated (select → invoke → append → check-termination) cycles
//! over the shared transcript, bounded by the iteration cap. Turns are
//! produced lazily: each `next_turn` call performs one cycle and yields the
//! appended message, so the caller can render progressively or abandon the
//! sequence at any point.

use std::sync::Arc;

use crate::chat::agent::ChatAgent;
use crate::chat::invoker::AgentInvoker;
use crate::chat::selection::SelectionStrategy;
use crate::chat::termination::TerminationStrategy;
use crate::chat::transcript::Transcript;
use crate::core::{Message, RedraftError, Result};

/// Where the controller is in the current submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No submission in flight
    Idle,
    /// Waiting for the next agent turn
    AwaitingAgent,
    /// A reviewer just spoke; termination is being decided
    Evaluating,
    /// The current submission has finished
    Complete,
}

/// Tunables for a group chat session
#[derive(Debug, Clone)]
pub struct GroupChatSettings {
    /// Unconditional cap on agent turns per submission
    pub max_iterations: usize,
    /// How many recent messages the termination policy sees
    pub evaluation_window: usize,
    /// Agents whose turns are eligible for termination evaluation
    pub reviewers: Vec<String>,
}

impl Default for GroupChatSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            evaluation_window: 2,
            reviewers: Vec::new(),
        }
    }
}

/// Multi-agent conversation controller
pub struct GroupChat {
    agents: Vec<ChatAgent>,
    transcript: Transcript,
    selection: Box<dyn SelectionStrategy>,
    termination: Box<dyn TerminationStrategy>,
    invoker: Arc<dyn AgentInvoker>,
    settings: GroupChatSettings,
    iteration_count: usize,
    phase: Phase,
}

impl GroupChat {
    /// Create a new controller
    ///
    /// Agent names must be unique; reviewers must name registered agents.
    pub fn new(
        agents: Vec<ChatAgent>,
        selection: Box<dyn SelectionStrategy>,
        termination: Box<dyn TerminationStrategy>,
        invoker: Arc<dyn AgentInvoker>,
        settings: GroupChatSettings,
        max_history: usize,
    ) -> Result<Self> {
        for (i, agent) in agents.iter().enumerate() {
            if agents[..i].iter().any(|a| a.name() == agent.name()) {
                return Err(RedraftError::config(format!(
                    "duplicate agent name '{}'",
                    agent.name()
                )));
            }
        }
        for reviewer in &settings.reviewers {
            if !agents.iter().any(|a| a.name() == reviewer) {
                return Err(RedraftError::UnknownParticipant(reviewer.clone()));
            }
        }

        Ok(Self {
            agents,
            transcript: Transcript::new(max_history),
            selection,
            termination,
            invoker,
            settings,
            iteration_count: 0,
            phase: Phase::Idle,
        })
    }

    /// Start a new submission with the user's text
    ///
    /// The transcript is preserved across submissions; only `reset` clears
    /// it. The iteration counter restarts for the new turn sequence.
    pub fn submit(&mut self, text: impl Into<String>) {
        self.transcript.append(Message::user(text));
        self.iteration_count = 0;
        self.phase = Phase::AwaitingAgent;
    }

    /// Perform one (select → invoke → append → check) cycle
    ///
    /// Returns the message appended this cycle, or `None` once the current
    /// submission is complete (or none is in flight). A turn failure leaves
    /// the transcript untouched and returns the controller to idle; the
    /// caller may re-submit to retry.
    pub async fn next_turn(&mut self) -> Result<Option<Message>> {
        match self.phase {
            Phase::Idle | Phase::Complete => return Ok(None),
            Phase::AwaitingAgent | Phase::Evaluating => {}
        }

        match self.advance().await {
            Ok(message) => Ok(Some(message)),
            Err(e) => {
                self.phase = Phase::Idle;
                Err(e)
            }
        }
    }

    async fn advance(&mut self) -> Result<Message> {
        let name = self
            .selection
            .select_next(&self.transcript, &self.agents)
            .await?;

        let agent = self
            .agents
            .iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| RedraftError::UnknownParticipant(name.clone()))?
            .clone();

        let context: Vec<Message> = self.transcript.messages().cloned().collect();

        // Appended only after the invocation fully succeeds
        let text = self
            .invoker
            .invoke(&agent, &context)
            .await
            .map_err(|e| match e {
                RedraftError::Invocation(_) => e,
                other => RedraftError::Invocation(other.to_string()),
            })?;
        let message = self.transcript.append(Message::agent(agent.name(), text));
        self.iteration_count += 1;

        if self.settings.reviewers.iter().any(|r| r == agent.name()) {
            self.phase = Phase::Evaluating;
            let window = self.transcript.window(self.settings.evaluation_window);
            let terminated = self.termination.should_terminate(&window).await?;
            self.phase = if terminated {
                Phase::Complete
            } else {
                Phase::AwaitingAgent
            };
        } else {
            self.phase = Phase::AwaitingAgent;
        }

        // Unconditional guard, independent of the termination policy
        if self.iteration_count >= self.settings.max_iterations {
            self.phase = Phase::Complete;
        }

        Ok(message)
    }

    /// Run the current submission to completion, collecting every turn
    pub async fn run(&mut self) -> Result<Vec<Message>> {
        let mut turns = Vec::new();
        while let Some(message) = self.next_turn().await? {
            turns.push(message);
        }
        Ok(turns)
    }

    /// Clear the transcript and counters; usable from any state
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.iteration_count = 0;
        self.phase = Phase::Idle;
    }

    /// The shared transcript
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Agent turns completed for the current submission
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    /// Whether the current submission has finished
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Current controller phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Registered agents
    pub fn agents(&self) -> &[ChatAgent] {
        &self.agents
    }
}
