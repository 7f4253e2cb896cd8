//! Guess the secret number.

use qiblahub_core::error::DomainError;
use qiblahub_core::rng::DeterministicRng;
use serde::Serialize;
use tracing::debug;

/// Smallest possible secret.
pub const MIN_SECRET: u32 = 1;

/// Largest possible secret.
pub const MAX_SECRET: u32 = 100;

/// Answer to a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessFeedback {
    TooLow,
    TooHigh,
    Correct,
}

/// One round of the guessing game.
#[derive(Debug, Clone)]
pub struct NumberGuess {
    secret: u32,
    attempts: u32,
    solved: bool,
}

impl NumberGuess {
    /// Starts a round with a secret drawn from `rng`.
    pub fn new(rng: &mut dyn DeterministicRng) -> Self {
        Self {
            secret: rng.next_u32_range(MIN_SECRET, MAX_SECRET),
            attempts: 0,
            solved: false,
        }
    }

    /// Guesses made so far, including the winning one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// `true` once the secret has been found.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Checks `value` against the secret.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the round is already solved or
    /// `value` is outside 1..=100. Rejected guesses are not counted.
    pub fn guess(&mut self, value: u32) -> Result<GuessFeedback, DomainError> {
        if self.solved {
            return Err(DomainError::Validation(
                "round is over; start a new one".to_owned(),
            ));
        }
        if !(MIN_SECRET..=MAX_SECRET).contains(&value) {
            return Err(DomainError::Validation(format!(
                "guess must be between {MIN_SECRET} and {MAX_SECRET}, got {value}"
            )));
        }
        self.attempts += 1;
        let feedback = match value.cmp(&self.secret) {
            std::cmp::Ordering::Less => GuessFeedback::TooLow,
            std::cmp::Ordering::Greater => GuessFeedback::TooHigh,
            std::cmp::Ordering::Equal => {
                self.solved = true;
                debug!(attempts = self.attempts, "number guessed");
                GuessFeedback::Correct
            }
        };
        Ok(feedback)
    }

    /// Starts over with a fresh secret.
    pub fn restart(&mut self, rng: &mut dyn DeterministicRng) {
        *self = Self::new(rng);
    }
}
