//! Bounded, externally gated continuations.
//!
//! ```text
//! Eligible --failure (used < max)--> Prompting --granted--> Resuming --first input--> Eligible | Exhausted
//!     |                                   |
//!     +--failure (used == max)--+         +--declined--> Exhausted
//!                               v
//!                           Exhausted
//! ```
//!
//! The controller only tracks the retry budget and the outstanding oracle
//! ticket. Clock and phase changes belong to the session that owns it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What caused the player to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    WrongAnswer,
    RateShortfall,
}

/// Answer from the reward oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Granted,
    Declined,
}

/// Identifies one continuation prompt. Resolutions carrying any other
/// ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContinuationState {
    Eligible,
    Prompting { ticket: ContinuationTicket },
    Resuming,
    Exhausted,
}

/// How the session should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    /// Ask the oracle; the session waits for this ticket.
    Offer(ContinuationTicket),
    /// No continuations left: the session ends without a prompt.
    GameOver,
    /// A prompt is already outstanding.
    AlreadyPrompting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Granted { used: u32 },
    Declined,
    /// Unknown or already-resolved ticket.
    Stale,
}

#[derive(Debug, Clone)]
pub struct ContinuationController {
    state: ContinuationState,
    used: u32,
    max: u32,
    next_ticket: u64,
}

impl ContinuationController {
    pub fn new(max: u32) -> Self {
        Self {
            state: if max == 0 {
                ContinuationState::Exhausted
            } else {
                ContinuationState::Eligible
            },
            used: 0,
            max,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> ContinuationState {
        self.state
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.used)
    }

    pub fn pending_ticket(&self) -> Option<ContinuationTicket> {
        match self.state {
            ContinuationState::Prompting { ticket } => Some(ticket),
            _ => None,
        }
    }

    pub fn on_failure(&mut self, kind: FailureKind) -> FailureDecision {
        match self.state {
            ContinuationState::Prompting { ticket } => {
                warn!(?kind, ticket = ticket.0, "failure while a prompt is outstanding; ignoring");
                FailureDecision::AlreadyPrompting
            }
            ContinuationState::Exhausted => FailureDecision::GameOver,
            ContinuationState::Eligible | ContinuationState::Resuming => {
                if self.used >= self.max {
                    self.state = ContinuationState::Exhausted;
                    info!(?kind, used = self.used, "continuations exhausted");
                    return FailureDecision::GameOver;
                }
                let ticket = ContinuationTicket(self.next_ticket);
                self.next_ticket += 1;
                self.state = ContinuationState::Prompting { ticket };
                info!(?kind, ticket = ticket.0, used = self.used, max = self.max, "offering continuation");
                FailureDecision::Offer(ticket)
            }
        }
    }

    pub fn resolve(&mut self, ticket: ContinuationTicket, verdict: Verdict) -> Resolution {
        if self.pending_ticket() != Some(ticket) {
            warn!(ticket = ticket.0, ?verdict, state = ?self.state, "stale continuation resolution");
            return Resolution::Stale;
        }
        match verdict {
            Verdict::Granted => {
                self.used += 1;
                self.state = ContinuationState::Resuming;
                info!(ticket = ticket.0, used = self.used, "continuation granted");
                Resolution::Granted { used: self.used }
            }
            Verdict::Declined => {
                self.state = ContinuationState::Exhausted;
                info!(ticket = ticket.0, "continuation declined");
                Resolution::Declined
            }
        }
    }

    /// The player's first input after a grant. Returns `false` when the
    /// controller was not resuming.
    pub fn first_input(&mut self) -> bool {
        if self.state != ContinuationState::Resuming {
            return false;
        }
        self.state = if self.used < self.max {
            ContinuationState::Eligible
        } else {
            ContinuationState::Exhausted
        };
        true
    }

    /// Invalidate any outstanding ticket; later resolutions become stale.
    pub fn cancel(&mut self) {
        self.state = ContinuationState::Exhausted;
    }
}
