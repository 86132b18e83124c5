use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FailureKind;

/// Why a session reached `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Wrong answer with no continuations left.
    WrongAnswer,
    /// Missed the per-minute quota with no continuations left.
    RateShortfall,
    /// The oracle declined, failed or timed out.
    ContinuationDeclined,
    /// The player left.
    Quit,
}

impl From<FailureKind> for EndReason {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::WrongAnswer => EndReason::WrongAnswer,
            FailureKind::RateShortfall => EndReason::RateShortfall,
        }
    }
}

/// Final result handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub final_score: u64,
    pub derived_xp: u64,
    pub challenges_answered: u32,
    pub continuations_used: u32,
    pub active_play_time_ms: i64,
    pub end_reason: EndReason,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Experience awarded for a final score.
pub fn derive_xp(final_score: u64) -> u64 {
    final_score / 10
}

/// Persistence collaborator notified once per finished session.
pub trait SessionSink: Send {
    fn on_session_end(&mut self, summary: &SessionSummary);
}

/// Sink that keeps every summary in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub summaries: Vec<SessionSummary>,
}

impl SessionSink for MemorySink {
    fn on_session_end(&mut self, summary: &SessionSummary) {
        self.summaries.push(summary.clone());
    }
}
