//! Active-time accounting for a survival session.
//!
//! Wall-clock instants go in, pause-adjusted "active play time" comes out.
//! The [`InputLedger`] stores inputs in active-time coordinates and the
//! [`RateGate`] audits each completed active-time minute against the quota.

mod ledger;
mod play_clock;
mod rate_gate;

pub use ledger::InputLedger;
pub use play_clock::PlayClock;
pub use rate_gate::{MinuteAudit, QuotaPolicy, RateGate};

use chrono::Duration;

/// Length of one audited minute of active play, in milliseconds.
pub const MINUTE_MS: i64 = 60_000;

/// Zero-based active-time minute containing `active`.
pub fn minute_index(active: Duration) -> u64 {
    (active.num_milliseconds().max(0) / MINUTE_MS) as u64
}

/// Start offset of the given minute in active time.
pub fn minute_start(minute: u64) -> Duration {
    Duration::milliseconds(minute as i64 * MINUTE_MS)
}
