//! Per-minute input-rate audit.
//!
//! Once the active clock crosses a minute boundary, the minute that just
//! completed is compared against an escalating quota:
//!
//! ```text
//! required(m) = min(base_quota + m, quota_cap)
//! ```
//!
//! The running minute is never judged. A minute is marked checked before it
//! is evaluated, so repeated polls within the same minute are no-ops.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{minute_index, minute_start, InputLedger, MINUTE_MS};

/// Escalating per-minute input quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    pub base_quota: u32,
    pub quota_cap: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            base_quota: 30,
            quota_cap: 60,
        }
    }
}

impl QuotaPolicy {
    /// Inputs required during completed minute `minute`.
    pub fn required_for_minute(&self, minute: u64) -> u32 {
        let escalated = u64::from(self.base_quota).saturating_add(minute);
        escalated.min(u64::from(self.quota_cap)) as u32
    }
}

/// Result of auditing one completed minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteAudit {
    pub minute: u64,
    pub required: u32,
    pub actual: u32,
}

impl MinuteAudit {
    pub fn passed(&self) -> bool {
        self.actual >= self.required
    }
}

#[derive(Debug, Clone)]
pub struct RateGate {
    policy: QuotaPolicy,
    last_checked_minute: u64,
}

impl RateGate {
    pub fn new(policy: QuotaPolicy) -> Self {
        Self {
            policy,
            last_checked_minute: 0,
        }
    }

    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    pub fn last_checked_minute(&self) -> u64 {
        self.last_checked_minute
    }

    /// Audit the previous minute if a new minute boundary has been crossed.
    ///
    /// Returns `None` when there is nothing to audit yet.
    pub fn poll(&mut self, active: Duration, ledger: &InputLedger) -> Option<MinuteAudit> {
        let current_minute = minute_index(active);
        if current_minute <= self.last_checked_minute || active.num_milliseconds() < MINUTE_MS {
            return None;
        }
        let completed = current_minute - 1;
        let required = self.policy.required_for_minute(completed);
        let actual =
            ledger.count_in_window(minute_start(completed), minute_start(completed + 1)) as u32;
        self.last_checked_minute = current_minute;

        let audit = MinuteAudit {
            minute: completed,
            required,
            actual,
        };
        debug!(
            minute = audit.minute,
            required = audit.required,
            actual = audit.actual,
            passed = audit.passed(),
            "rate audit"
        );
        Some(audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: i64) -> Duration {
        Duration::seconds(s)
    }

    fn filled_ledger(per_minute: &[u32]) -> InputLedger {
        let mut ledger = InputLedger::new(Duration::minutes(5));
        for (minute, &count) in per_minute.iter().enumerate() {
            for i in 0..count {
                let offset = minute as i64 * MINUTE_MS + i64::from(i) * 1_000;
                ledger.record(Duration::milliseconds(offset));
            }
        }
        ledger
    }

    #[test]
    fn required_escalates_and_caps() {
        let policy = QuotaPolicy::default();
        assert_eq!(policy.required_for_minute(0), 30);
        assert_eq!(policy.required_for_minute(29), 59);
        assert_eq!(policy.required_for_minute(30), 60);
        assert_eq!(policy.required_for_minute(500), 60);
    }

    #[test]
    fn nothing_to_audit_in_first_minute() {
        let mut gate = RateGate::new(QuotaPolicy::default());
        let ledger = filled_ledger(&[]);
        assert!(gate.poll(secs(59), &ledger).is_none());
        assert_eq!(gate.last_checked_minute(), 0);
    }

    #[test]
    fn audits_completed_minute_once() {
        let mut gate = RateGate::new(QuotaPolicy::default());
        let ledger = filled_ledger(&[30]);
        let audit = gate.poll(secs(60), &ledger).unwrap();
        assert_eq!(audit.minute, 0);
        assert_eq!(audit.required, 30);
        assert_eq!(audit.actual, 30);
        assert!(audit.passed());

        assert!(gate.poll(secs(60), &ledger).is_none());
        assert!(gate.poll(Duration::milliseconds(60_400), &ledger).is_none());
        assert!(gate.poll(secs(119), &ledger).is_none());
    }

    #[test]
    fn shortfall_is_reported_and_still_marked() {
        let mut gate = RateGate::new(QuotaPolicy::default());
        let ledger = filled_ledger(&[30, 12]);
        assert!(gate.poll(secs(61), &ledger).unwrap().passed());

        let audit = gate.poll(secs(121), &ledger).unwrap();
        assert_eq!(audit.minute, 1);
        assert_eq!(audit.required, 31);
        assert_eq!(audit.actual, 12);
        assert!(!audit.passed());
        assert_eq!(gate.last_checked_minute(), 2);
    }

    #[test]
    fn skipped_minutes_audit_only_the_latest() {
        let mut gate = RateGate::new(QuotaPolicy::default());
        let ledger = filled_ledger(&[30, 31, 32]);
        let audit = gate.poll(secs(185), &ledger).unwrap();
        assert_eq!(audit.minute, 2);
        assert_eq!(gate.last_checked_minute(), 3);
    }
}
