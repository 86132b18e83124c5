//! # Reflexa Core Library
//!
//! This library provides the core logic for Reflexa's survival mode: a
//! stream of timed colour-word challenges under an escalating minimum input
//! rate, with a small budget of externally confirmed continuations.
//!
//! ## Architecture
//!
//! - **Survival Session**: the single owner of all session state. A
//!   wall-clock-driven state machine; the caller passes `now` into every
//!   command and calls `tick()` periodically
//! - **Play Clock**: pause-aware active play time
//! - **Rate Gate**: per-minute quota audit over the input ledger
//! - **Continuations**: bounded retries gated on a reward oracle
//! - **Runtime**: tokio loop serialising ticks, input and oracle results
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SurvivalSession`]: Session aggregator
//! - [`PlayClock`]: Active-time clock
//! - [`SessionRuntime`]: Async driver
//! - [`RewardOracle`]: Trait for the reward-confirmation service
//! - [`Config`]: Application configuration management

pub mod challenge;
pub mod clock;
pub mod error;
pub mod events;
pub mod oracle;
pub mod recall;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod storage;

pub use challenge::{Challenge, ChallengeGenerator, Color};
pub use clock::{InputLedger, MinuteAudit, PlayClock, QuotaPolicy, RateGate};
pub use error::{ConfigError, CoreError, OracleError, TransitionError, ValidationError};
pub use events::Event;
pub use oracle::{FixedOracle, RewardOracle};
pub use recall::{AttemptOutcome, RecallGame, RecallSummary};
pub use runtime::{Command, RuntimeSettings, SessionRuntime, SystemTimeSource, TimeSource};
pub use scoring::{Award, ScoreBucket, ScoringTable};
pub use session::{
    ContinuationController, ContinuationTicket, EndReason, FailureKind, MemorySink, Phase,
    SessionSettings, SessionSink, SessionSummary, SurvivalSession, Verdict,
};
pub use storage::Config;
