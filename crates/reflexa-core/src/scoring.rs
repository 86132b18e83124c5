//! Reaction-latency scoring.
//!
//! Latency is measured in wall-clock time from the moment a challenge is
//! shown to the qualifying input. Buckets are ordered by ascending upper
//! bound; the first bucket whose bound exceeds the latency wins, anything
//! slower falls through to the floor award.
//!
//! | Latency      | Points | Label     |
//! |--------------|--------|-----------|
//! | < 400 ms     | 100    | lightning |
//! | < 700 ms     | 70     | fast      |
//! | < 1000 ms    | 50     | good      |
//! | < 1500 ms    | 30     | ok        |
//! | otherwise    | 10     | slow      |

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One latency bucket: latencies strictly below `max_latency_ms` earn
/// `points`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub max_latency_ms: u64,
    pub points: u32,
    pub label: String,
}

impl ScoreBucket {
    pub fn new(max_latency_ms: u64, points: u32, label: impl Into<String>) -> Self {
        Self {
            max_latency_ms,
            points,
            label: label.into(),
        }
    }
}

/// Points and qualitative label awarded for one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub points: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringTable {
    #[serde(default = "default_buckets")]
    pub buckets: Vec<ScoreBucket>,
    #[serde(default = "default_slow_points")]
    pub slow_points: u32,
    #[serde(default = "default_slow_label")]
    pub slow_label: String,
}

fn default_buckets() -> Vec<ScoreBucket> {
    vec![
        ScoreBucket::new(400, 100, "lightning"),
        ScoreBucket::new(700, 70, "fast"),
        ScoreBucket::new(1_000, 50, "good"),
        ScoreBucket::new(1_500, 30, "ok"),
    ]
}
fn default_slow_points() -> u32 {
    10
}
fn default_slow_label() -> String {
    "slow".into()
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            buckets: default_buckets(),
            slow_points: default_slow_points(),
            slow_label: default_slow_label(),
        }
    }
}

impl ScoringTable {
    /// Map a reaction latency to its award. Negative latencies (clock
    /// regression) score as instantaneous.
    pub fn score(&self, latency: Duration) -> Award {
        let latency_ms = latency.num_milliseconds().max(0) as u64;
        self.buckets
            .iter()
            .find(|b| latency_ms < b.max_latency_ms)
            .map(|b| Award {
                points: b.points,
                label: b.label.clone(),
            })
            .unwrap_or_else(|| Award {
                points: self.slow_points,
                label: self.slow_label.clone(),
            })
    }

    /// Check that thresholds ascend strictly and points descend strictly,
    /// ending above the floor award.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.buckets.is_empty() {
            return Err(ValidationError::EmptyCollection("scoring.buckets".into()));
        }
        for pair in self.buckets.windows(2) {
            if pair[1].max_latency_ms <= pair[0].max_latency_ms {
                return Err(ValidationError::InvalidValue {
                    field: "scoring.buckets".into(),
                    message: format!(
                        "thresholds must ascend: {} then {}",
                        pair[0].max_latency_ms, pair[1].max_latency_ms
                    ),
                });
            }
            if pair[1].points >= pair[0].points {
                return Err(ValidationError::InvalidValue {
                    field: "scoring.buckets".into(),
                    message: format!(
                        "points must strictly decrease: {} then {}",
                        pair[0].points, pair[1].points
                    ),
                });
            }
        }
        let last = &self.buckets[self.buckets.len() - 1];
        if self.slow_points >= last.points {
            return Err(ValidationError::InvalidValue {
                field: "scoring.slow_points".into(),
                message: format!("must be below the last bucket ({})", last.points),
            });
        }
        Ok(())
    }
}
