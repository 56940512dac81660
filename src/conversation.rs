//! Conversation state for one coaching session.
//!
//! The original behavior of mutating the last list element while a reply
//! streams is modeled here as an explicit state machine, so the
//! "replace the trailing assistant turn" step is a named transition rather
//! than an implicit array write.

use crate::types::Turn;
use crate::{Error, Result};

/// The streaming phase of a conversation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StreamPhase {
    /// No exchange in flight.
    Idle,

    /// The user turn is recorded and the request is open, but no content
    /// has arrived yet. The conversation still ends with the user turn.
    AwaitingFirstToken,

    /// At least one delta has arrived; the conversation ends with an
    /// in-progress assistant turn that is replaced wholesale on each delta.
    Streaming,

    /// The byte stream ended and the accumulated reply is being handed off
    /// for persistence.
    Finalizing,

    /// The exchange failed. Any partial assistant turn stays visible in
    /// memory but was never persisted.
    Failed,
}

/// An ordered sequence of turns scoped to one signed-in identity, plus the
/// streaming state machine for the exchange in flight.
#[derive(Debug)]
pub struct Conversation {
    turns: Vec<Turn>,
    phase: StreamPhase,
    pending: String,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            phase: StreamPhase::Idle,
            pending: String::new(),
        }
    }

    /// Replaces the conversation history, e.g. from the message store.
    ///
    /// Only legal while no exchange is in flight.
    pub fn load(&mut self, turns: Vec<Turn>) -> Result<()> {
        if self.exchange_in_flight() {
            return Err(Error::busy("cannot load history while a reply is streaming"));
        }
        self.turns = turns;
        self.phase = StreamPhase::Idle;
        self.pending.clear();
        Ok(())
    }

    /// Transition: a new exchange begins with the given user turn.
    ///
    /// The turn is appended immediately (optimistically), before any
    /// persistence acknowledgment.
    pub fn begin_exchange(&mut self, user_turn: Turn) -> Result<()> {
        if self.exchange_in_flight() {
            return Err(Error::busy("an exchange is already streaming"));
        }
        self.turns.push(user_turn);
        self.pending.clear();
        self.phase = StreamPhase::AwaitingFirstToken;
        Ok(())
    }

    /// Transition: a content fragment arrived.
    ///
    /// The first fragment creates the assistant turn; every fragment
    /// replaces that turn wholesale with the complete-so-far text, so a
    /// reader of [`turns`](Self::turns) always sees the full accumulation.
    pub fn apply_delta(&mut self, fragment: &str) {
        match self.phase {
            StreamPhase::AwaitingFirstToken => {
                self.turns.push(Turn::assistant(""));
                self.phase = StreamPhase::Streaming;
            }
            StreamPhase::Streaming => {}
            // Fragments outside an exchange are decoder noise; drop them.
            StreamPhase::Idle | StreamPhase::Finalizing | StreamPhase::Failed => return,
        }
        self.pending.push_str(fragment);
        if let Some(last) = self.turns.last_mut() {
            *last = Turn::assistant(self.pending.clone());
        }
    }

    /// Transition: the byte stream signaled end-of-input.
    ///
    /// Returns the accumulated assistant content when any arrived; the
    /// caller decides whether to persist it. Leaves the conversation idle.
    pub fn finish(&mut self) -> Option<String> {
        let content = match self.phase {
            StreamPhase::Streaming => {
                self.phase = StreamPhase::Finalizing;
                Some(std::mem::take(&mut self.pending))
            }
            _ => {
                self.pending.clear();
                None
            }
        };
        self.phase = StreamPhase::Idle;
        content
    }

    /// Transition: the exchange failed.
    ///
    /// Partial content already applied to the trailing assistant turn stays
    /// in memory (matching the on-screen behavior), but is discarded for
    /// persistence purposes.
    pub fn fail(&mut self) {
        self.pending.clear();
        self.phase = StreamPhase::Failed;
    }

    /// True while an exchange is between `begin_exchange` and
    /// `finish`/`fail`.
    pub fn exchange_in_flight(&self) -> bool {
        matches!(
            self.phase,
            StreamPhase::AwaitingFirstToken | StreamPhase::Streaming | StreamPhase::Finalizing
        )
    }

    /// The current phase.
    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// The ordered turn history.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turns have been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Clears the history and resets the state machine.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.pending.clear();
        self.phase = StreamPhase::Idle;
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
