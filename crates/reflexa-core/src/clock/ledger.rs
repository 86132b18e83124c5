//! Append-only record of player inputs in active-time coordinates.

use std::collections::VecDeque;

use chrono::Duration;
use tracing::warn;

/// Input timestamps as active-time offsets, oldest first.
///
/// Entries older than the retention window (relative to the newest append)
/// are pruned lazily on every [`record`](Self::record).
#[derive(Debug, Clone)]
pub struct InputLedger {
    entries: VecDeque<Duration>,
    retention: Duration,
}

impl InputLedger {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: VecDeque::new(),
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an input at `at` and drop everything older than
    /// `at - retention`.
    ///
    /// An offset earlier than the newest entry is clamped up to it, keeping
    /// the ledger sorted.
    pub fn record(&mut self, at: Duration) {
        let at = match self.entries.back() {
            Some(&last) if at < last => {
                warn!(
                    at_ms = at.num_milliseconds(),
                    last_ms = last.num_milliseconds(),
                    "input recorded out of order; clamping to newest entry"
                );
                last
            }
            _ => at,
        };
        self.entries.push_back(at);

        let horizon = at - self.retention;
        while self.entries.front().is_some_and(|&t| t < horizon) {
            self.entries.pop_front();
        }
    }

    /// Count entries with `start <= t < end`.
    pub fn count_in_window(&self, start: Duration, end: Duration) -> usize {
        if end <= start {
            return 0;
        }
        let lo = self.entries.partition_point(|&t| t < start);
        let hi = self.entries.partition_point(|&t| t < end);
        hi - lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: i64) -> Duration {
        Duration::milliseconds(v)
    }

    fn ledger() -> InputLedger {
        InputLedger::new(Duration::minutes(5))
    }

    #[test]
    fn window_is_lower_inclusive_upper_exclusive() {
        let mut l = ledger();
        for t in [10_000, 59_900, 60_000, 61_000] {
            l.record(ms(t));
        }
        assert_eq!(l.count_in_window(ms(60_000), ms(120_000)), 2);
        assert_eq!(l.count_in_window(ms(0), ms(60_000)), 2);
    }

    #[test]
    fn prunes_entries_outside_retention() {
        let mut l = ledger();
        l.record(ms(1_000));
        l.record(ms(2_000));
        l.record(ms(301_500));
        assert_eq!(l.len(), 2);
        assert_eq!(l.count_in_window(ms(0), ms(2_000)), 0);
    }

    #[test]
    fn entry_exactly_on_horizon_is_kept() {
        let mut l = ledger();
        l.record(ms(0));
        l.record(ms(300_000));
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn out_of_order_append_is_clamped() {
        let mut l = ledger();
        l.record(ms(5_000));
        l.record(ms(4_000));
        assert_eq!(l.count_in_window(ms(5_000), ms(5_001)), 2);
    }

    #[test]
    fn empty_or_inverted_window_counts_zero() {
        let mut l = ledger();
        l.record(ms(10));
        assert_eq!(l.count_in_window(ms(20), ms(10)), 0);
        assert_eq!(l.count_in_window(ms(10), ms(10)), 0);
    }

    proptest! {
        #[test]
        fn count_matches_linear_scan(
            mut offsets in prop::collection::vec(0i64..240_000, 0..200),
            start in 0i64..240_000,
            width in 0i64..120_000,
        ) {
            offsets.sort_unstable();
            let mut l = ledger();
            for &t in &offsets {
                l.record(ms(t));
            }
            let end = start + width;
            let expected = offsets.iter().filter(|&&t| t >= start && t < end).count();
            prop_assert_eq!(l.count_in_window(ms(start), ms(end)), expected);
        }
    }
}
