//! Survival session: phase machine, continuation budget and the aggregator
//! that owns them.

mod continuation;
mod engine;
mod phase;
mod summary;

pub use continuation::{
    ContinuationController, ContinuationState, ContinuationTicket, FailureDecision, FailureKind,
    Resolution, Verdict,
};
pub use engine::{SessionSettings, SurvivalSession};
pub use phase::{Phase, Transition};
pub use summary::{derive_xp, EndReason, MemorySink, SessionSink, SessionSummary};
