//! Colour-word interference challenges.
//!
//! A colour name is rendered in an ink colour and the player must pick the
//! ink. The word and ink always differ, so the word's meaning can never
//! coincide with the correct answer.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Purple,
        Color::Orange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Orange => "orange",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Color::ALL
            .into_iter()
            .find(|c| c.name() == needle)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "color".into(),
                message: format!("unknown colour '{s}'"),
            })
    }
}

/// A stimulus plus the set of answers that count as correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// The colour name that is displayed.
    pub word: Color,
    /// The colour the word is rendered in.
    pub ink: Color,
    /// Answer buttons, in display order.
    pub options: Vec<Color>,
    pub correct_answers: Vec<Color>,
}

impl Challenge {
    pub fn is_correct(&self, answer: Color) -> bool {
        self.correct_answers.contains(&answer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeGenerator {
    option_count: usize,
}

impl Default for ChallengeGenerator {
    fn default() -> Self {
        Self { option_count: 4 }
    }
}

impl ChallengeGenerator {
    pub const MIN_OPTIONS: usize = 2;
    pub const MAX_OPTIONS: usize = Color::ALL.len();

    pub fn new(option_count: usize) -> Result<Self, ValidationError> {
        if !(Self::MIN_OPTIONS..=Self::MAX_OPTIONS).contains(&option_count) {
            return Err(ValidationError::InvalidValue {
                field: "challenge.option_count".into(),
                message: format!(
                    "must be between {} and {}, got {option_count}",
                    Self::MIN_OPTIONS,
                    Self::MAX_OPTIONS
                ),
            });
        }
        Ok(Self { option_count })
    }

    pub fn option_count(&self) -> usize {
        self.option_count
    }

    /// Draw the next challenge. Options always contain both the ink (the
    /// answer) and the word (the distractor), padded with other colours.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Challenge {
        let ink = Color::ALL[rng.gen_range(0..Color::ALL.len())];
        let word = loop {
            let candidate = Color::ALL[rng.gen_range(0..Color::ALL.len())];
            if candidate != ink {
                break candidate;
            }
        };

        let mut fillers: Vec<Color> = Color::ALL
            .into_iter()
            .filter(|c| *c != ink && *c != word)
            .collect();
        fillers.shuffle(rng);

        let mut options = vec![ink, word];
        options.extend(fillers.into_iter().take(self.option_count - 2));
        options.shuffle(rng);

        Challenge {
            word,
            ink,
            options,
            correct_answers: vec![ink],
        }
    }
}
