//! Recall-sequence mini-game.
//!
//! The player is shown a colour sequence and must repeat it. Every correct
//! attempt scores the sequence length and grows the next sequence by one,
//! up to a ceiling. The first mistake ends the game. There is no clock,
//! rate audit or continuation here.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::challenge::Color;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallPhase {
    Showing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptOutcome {
    /// Correct; the next sequence has `next_length` colours.
    Advanced { points: u64, next_length: usize },
    /// Wrong; the game is over.
    Failed,
    /// The game had already finished.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallSummary {
    pub score: u64,
    pub rounds_completed: u32,
    pub longest_sequence: usize,
}

#[derive(Debug, Clone)]
pub struct RecallGame {
    phase: RecallPhase,
    sequence: Vec<Color>,
    max_length: usize,
    score: u64,
    rounds_completed: u32,
    longest_sequence: usize,
}

impl RecallGame {
    pub fn new<R: Rng + ?Sized>(
        start_length: usize,
        max_length: usize,
        rng: &mut R,
    ) -> Result<Self, ValidationError> {
        if start_length == 0 {
            return Err(ValidationError::InvalidValue {
                field: "recall.start_length".into(),
                message: "must be at least 1".into(),
            });
        }
        if max_length < start_length {
            return Err(ValidationError::InvalidValue {
                field: "recall.max_length".into(),
                message: format!("must be >= start_length ({start_length})"),
            });
        }
        Ok(Self {
            phase: RecallPhase::Showing,
            sequence: random_sequence(start_length, rng),
            max_length,
            score: 0,
            rounds_completed: 0,
            longest_sequence: 0,
        })
    }

    pub fn phase(&self) -> RecallPhase {
        self.phase
    }

    pub fn sequence(&self) -> &[Color] {
        &self.sequence
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn summary(&self) -> RecallSummary {
        RecallSummary {
            score: self.score,
            rounds_completed: self.rounds_completed,
            longest_sequence: self.longest_sequence,
        }
    }

    /// Check a full attempt against the shown sequence.
    pub fn attempt<R: Rng + ?Sized>(&mut self, attempt: &[Color], rng: &mut R) -> AttemptOutcome {
        if self.phase == RecallPhase::Finished {
            return AttemptOutcome::Ignored;
        }
        if attempt != self.sequence.as_slice() {
            debug!(length = self.sequence.len(), "recall attempt failed");
            self.phase = RecallPhase::Finished;
            return AttemptOutcome::Failed;
        }

        let length = self.sequence.len();
        let points = length as u64;
        self.score += points;
        self.rounds_completed += 1;
        self.longest_sequence = self.longest_sequence.max(length);

        let next_length = (length + 1).min(self.max_length);
        self.sequence = random_sequence(next_length, rng);
        AttemptOutcome::Advanced {
            points,
            next_length,
        }
    }
}

fn random_sequence<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Vec<Color> {
    (0..length)
        .map(|_| Color::ALL[rng.gen_range(0..Color::ALL.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn rng() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(3)
    }

    #[test]
    fn correct_attempts_grow_sequence() {
        let mut rng = rng();
        let mut game = RecallGame::new(3, 20, &mut rng).unwrap();
        for expected_len in 3..8 {
            assert_eq!(game.sequence().len(), expected_len);
            let attempt = game.sequence().to_vec();
            let outcome = game.attempt(&attempt, &mut rng);
            assert_eq!(
                outcome,
                AttemptOutcome::Advanced {
                    points: expected_len as u64,
                    next_length: expected_len + 1
                }
            );
        }
        assert_eq!(game.score(), 3 + 4 + 5 + 6 + 7);
        assert_eq!(game.summary().longest_sequence, 7);
    }

    #[test]
    fn length_stops_at_ceiling() {
        let mut rng = rng();
        let mut game = RecallGame::new(2, 3, &mut rng).unwrap();
        for _ in 0..4 {
            let attempt = game.sequence().to_vec();
            game.attempt(&attempt, &mut rng);
        }
        assert_eq!(game.sequence().len(), 3);
    }

    #[test]
    fn mistake_ends_game() {
        let mut rng = rng();
        let mut game = RecallGame::new(3, 20, &mut rng).unwrap();
        let mut attempt = game.sequence().to_vec();
        attempt.pop();
        assert_eq!(game.attempt(&attempt, &mut rng), AttemptOutcome::Failed);
        assert_eq!(game.phase(), RecallPhase::Finished);
        let again = game.sequence().to_vec();
        assert_eq!(game.attempt(&again, &mut rng), AttemptOutcome::Ignored);
        assert_eq!(game.summary().rounds_completed, 0);
    }

    #[test]
    fn rejects_bad_lengths() {
        let mut rng = rng();
        assert!(RecallGame::new(0, 5, &mut rng).is_err());
        assert!(RecallGame::new(6, 5, &mut rng).is_err());
    }
}
