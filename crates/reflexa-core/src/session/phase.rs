//! Session phase table.
//!
//! ```text
//! Idle --ShowFirstChallenge--> Active
//! Active --Pause--> Paused --Resume--> Active
//! Active --Fail--> AwaitingContinuation --Grant--> Active
//! Active | AwaitingContinuation --EndGame--> GameOver
//! (any but GameOver) --Quit--> GameOver
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Active,
    Paused,
    AwaitingContinuation,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    ShowFirstChallenge,
    Pause,
    Resume,
    Fail,
    Grant,
    EndGame,
    Quit,
}

impl Phase {
    /// Next phase for `transition`, or an error if the table forbids it.
    pub fn apply(self, transition: Transition) -> Result<Phase, TransitionError> {
        use Phase::*;
        use Transition::*;

        let next = match (self, transition) {
            (Idle, ShowFirstChallenge) => Active,
            (Active, Pause) => Paused,
            (Paused, Resume) => Active,
            (Active, Fail) => AwaitingContinuation,
            (AwaitingContinuation, Grant) => Active,
            (Active | AwaitingContinuation, EndGame) => GameOver,
            (Idle | Active | Paused | AwaitingContinuation, Quit) => GameOver,
            (from, transition) => return Err(TransitionError { from, transition }),
        };
        Ok(next)
    }

    pub fn is_over(self) -> bool {
        self == Phase::GameOver
    }
}
