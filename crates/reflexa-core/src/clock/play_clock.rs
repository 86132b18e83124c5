//! Pause-aware play clock.
//!
//! The clock never reads the system time itself: every operation takes the
//! caller's `now`. Active play time is
//!
//! ```text
//! active = (now - started_at) - accumulated_pause
//! ```
//!
//! where an in-progress pause freezes `now` at the instant the pause began.
//! Each pause episode is folded into `accumulated_pause` exactly once, when
//! it ends.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayClock {
    started_at: DateTime<Utc>,
    #[serde(default)]
    pause_started_at: Option<DateTime<Utc>>,
    /// Sum of all closed pause episodes, in milliseconds.
    #[serde(default)]
    accumulated_pause_ms: i64,
    #[serde(default)]
    closed_episodes: u32,
}

impl PlayClock {
    /// Create a running clock that started at `now`.
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            pause_started_at: None,
            accumulated_pause_ms: 0,
            closed_episodes: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    pub fn pause_started_at(&self) -> Option<DateTime<Utc>> {
        self.pause_started_at
    }

    pub fn accumulated_pause(&self) -> Duration {
        Duration::milliseconds(self.accumulated_pause_ms)
    }

    /// Number of pause episodes that have been opened and closed.
    pub fn closed_episodes(&self) -> u32 {
        self.closed_episodes
    }

    /// Active play time at `now`. Pure read, valid in any phase.
    pub fn active_time(&self, now: DateTime<Utc>) -> Duration {
        let effective_now = self.pause_started_at.unwrap_or(now);
        let wall = (effective_now - self.started_at).max(Duration::zero());
        (wall - self.accumulated_pause()).max(Duration::zero())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open a pause episode. Returns `false` (and changes nothing) when an
    /// episode is already open.
    pub fn enter_pause(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(since) = self.pause_started_at {
            warn!(%since, %now, "enter_pause while already paused; ignoring");
            return false;
        }
        self.pause_started_at = Some(now);
        true
    }

    /// Close the open pause episode and fold its length into the accumulated
    /// pause. Returns the episode length, or `None` when no episode was open.
    pub fn leave_pause(&mut self, now: DateTime<Utc>) -> Option<Duration> {
        let Some(since) = self.pause_started_at.take() else {
            warn!(%now, "leave_pause while not paused; ignoring");
            return None;
        };
        let mut elapsed = now - since;
        if elapsed < Duration::zero() {
            warn!(%since, %now, "wall clock moved backwards during pause; counting zero");
            elapsed = Duration::zero();
        }
        self.accumulated_pause_ms += elapsed.num_milliseconds();
        self.closed_episodes += 1;
        Some(elapsed)
    }

    /// Restart the clock from `now`, forgetting all pause history.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        *self = Self::start(now);
    }
}
