//! Rock-paper-scissors against the computer.

use qiblahub_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

/// A hand shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Throw {
    Rock,
    Paper,
    Scissors,
}

impl Throw {
    const ALL: [Self; 3] = [Self::Rock, Self::Paper, Self::Scissors];

    /// `true` if `self` defeats `other`.
    #[must_use]
    pub fn beats(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors) | (Self::Paper, Self::Rock) | (Self::Scissors, Self::Paper)
        )
    }

    fn draw(rng: &mut dyn DeterministicRng) -> Self {
        let index = rng.next_u32_range(0, 2) as usize;
        Self::ALL.get(index).copied().unwrap_or(Self::Rock)
    }
}

/// Result of a round from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

/// One played round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Round {
    pub player: Throw,
    pub computer: Throw,
    pub outcome: Outcome,
}

/// Running tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

/// A session of rounds with a running score.
#[derive(Debug, Clone, Default)]
pub struct RockPaperScissors {
    score: Score,
}

impl RockPaperScissors {
    /// A session with a zero score.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The score so far.
    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    /// Plays `player` against a computer throw drawn from `rng`.
    pub fn play(&mut self, player: Throw, rng: &mut dyn DeterministicRng) -> Round {
        let computer = Throw::draw(rng);
        let outcome = if player == computer {
            self.score.draws += 1;
            Outcome::Draw
        } else if player.beats(computer) {
            self.score.wins += 1;
            Outcome::Win
        } else {
            self.score.losses += 1;
            Outcome::Lose
        };
        Round {
            player,
            computer,
            outcome,
        }
    }
}
