use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::challenge::{Challenge, Color};
use crate::clock::MinuteAudit;
use crate::session::{ContinuationTicket, FailureKind, Phase, SessionSummary};

/// Every state change in a session produces an Event.
/// Front ends render them; the runtime reacts to the continuation and
/// session-end events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    ChallengeShown {
        challenge: Challenge,
        at: DateTime<Utc>,
    },
    AnswerScored {
        answer: Color,
        latency_ms: i64,
        points: u32,
        label: String,
        total_score: u64,
        at: DateTime<Utc>,
    },
    AnswerRejected {
        answer: Color,
        expected: Vec<Color>,
        at: DateTime<Utc>,
    },
    /// Input arrived while the session could not accept it.
    InputDiscarded {
        phase: Phase,
        at: DateTime<Utc>,
    },
    RateAudited {
        audit: MinuteAudit,
        at: DateTime<Utc>,
    },
    RateShortfall {
        minute: u64,
        required: u32,
        actual: u32,
        at: DateTime<Utc>,
    },
    /// The session is waiting on the reward oracle for `ticket`.
    ContinuationOffered {
        ticket: ContinuationTicket,
        failure: FailureKind,
        used: u32,
        max: u32,
        at: DateTime<Utc>,
    },
    ContinuationGranted {
        ticket: ContinuationTicket,
        used: u32,
        max: u32,
        at: DateTime<Utc>,
    },
    ContinuationDeclined {
        ticket: ContinuationTicket,
        at: DateTime<Utc>,
    },
    /// First input after a grant; the clock runs again.
    ResumeGateCleared {
        gated_ms: i64,
        active_ms: i64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        active_ms: i64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        paused_ms: i64,
        at: DateTime<Utc>,
    },
    SessionEnded {
        summary: SessionSummary,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::ChallengeShown { at, .. }
            | Event::AnswerScored { at, .. }
            | Event::AnswerRejected { at, .. }
            | Event::InputDiscarded { at, .. }
            | Event::RateAudited { at, .. }
            | Event::RateShortfall { at, .. }
            | Event::ContinuationOffered { at, .. }
            | Event::ContinuationGranted { at, .. }
            | Event::ContinuationDeclined { at, .. }
            | Event::ResumeGateCleared { at, .. }
            | Event::SessionPaused { at, .. }
            | Event::SessionResumed { at, .. }
            | Event::SessionEnded { at, .. } => *at,
        }
    }
}
