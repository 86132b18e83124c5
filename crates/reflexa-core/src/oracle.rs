//! Reward oracle seam.
//!
//! The reward service decides whether the player completed the rewarded
//! action that unlocks a continuation. The core treats it as an opaque async
//! source of [`Verdict`]s that may take minutes, fail, or never answer.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::OracleError;
use crate::session::Verdict;

#[async_trait]
pub trait RewardOracle: Send + Sync {
    async fn request_continuation(&self) -> Result<Verdict, OracleError>;
}

/// Oracle that answers with a fixed verdict after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct FixedOracle {
    pub delay: Duration,
    pub verdict: Verdict,
}

impl FixedOracle {
    pub fn granting(delay: Duration) -> Self {
        Self {
            delay,
            verdict: Verdict::Granted,
        }
    }

    pub fn declining(delay: Duration) -> Self {
        Self {
            delay,
            verdict: Verdict::Declined,
        }
    }
}

#[async_trait]
impl RewardOracle for FixedOracle {
    async fn request_continuation(&self) -> Result<Verdict, OracleError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_oracle_returns_its_verdict() {
        let granted = FixedOracle::granting(Duration::from_millis(1));
        assert_eq!(granted.request_continuation().await, Ok(Verdict::Granted));
        let declined = FixedOracle::declining(Duration::ZERO);
        assert_eq!(declined.request_continuation().await, Ok(Verdict::Declined));
    }
}
