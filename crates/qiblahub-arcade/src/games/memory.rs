//! Memory matching: find the eight pairs.

use qiblahub_core::error::DomainError;
use qiblahub_core::rng::DeterministicRng;
use serde::Serialize;
use tracing::debug;

/// Number of distinct symbols; each appears on two cards.
pub const PAIR_COUNT: usize = 8;

/// One card on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub symbol: u8,
    pub face_up: bool,
    pub matched: bool,
}

/// What a flip did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipResult {
    /// The card was already face up or matched.
    Ignored,
    /// First card of a pair attempt.
    FirstCard,
    /// Second card matched the first; both stay face up.
    Match,
    /// Second card did not match; both are hidden on the next flip.
    Mismatch,
    /// The last pair was found.
    Completed,
}

/// A shuffled table of sixteen cards.
#[derive(Debug, Clone)]
pub struct MemoryGame {
    cards: Vec<Card>,
    first: Option<usize>,
    pending_hide: Option<(usize, usize)>,
    moves: u32,
    pairs_found: usize,
}

impl MemoryGame {
    /// Deals the cards in an order shuffled with `rng` (Fisher–Yates).
    pub fn new(rng: &mut dyn DeterministicRng) -> Self {
        let mut cards: Vec<Card> = (0..PAIR_COUNT)
            .flat_map(|symbol| [symbol, symbol])
            .map(|symbol| Card {
                symbol: u8::try_from(symbol).unwrap_or(u8::MAX),
                face_up: false,
                matched: false,
            })
            .collect();
        for i in (1..cards.len()).rev() {
            let upper = u32::try_from(i).unwrap_or(u32::MAX);
            let j = rng.next_u32_range(0, upper) as usize;
            cards.swap(i, j);
        }
        Self {
            cards,
            first: None,
            pending_hide: None,
            moves: 0,
            pairs_found: 0,
        }
    }

    /// The table.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Completed pair attempts.
    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// `true` once every pair is face up.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pairs_found == PAIR_COUNT
    }

    /// Turns over the card at `index`. A mismatched pair from the previous
    /// attempt is hidden first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `index` is not on the table.
    pub fn flip(&mut self, index: usize) -> Result<FlipResult, DomainError> {
        if index >= self.cards.len() {
            return Err(DomainError::Validation(format!(
                "card {index} is not on the table"
            )));
        }
        if let Some((a, b)) = self.pending_hide.take() {
            self.cards[a].face_up = false;
            self.cards[b].face_up = false;
        }
        if self.cards[index].face_up || self.cards[index].matched {
            return Ok(FlipResult::Ignored);
        }
        self.cards[index].face_up = true;

        let Some(first) = self.first.take() else {
            self.first = Some(index);
            return Ok(FlipResult::FirstCard);
        };
        self.moves += 1;
        if self.cards[first].symbol != self.cards[index].symbol {
            self.pending_hide = Some((first, index));
            return Ok(FlipResult::Mismatch);
        }
        self.cards[first].matched = true;
        self.cards[index].matched = true;
        self.pairs_found += 1;
        if self.is_complete() {
            debug!(moves = self.moves, "memory game completed");
            Ok(FlipResult::Completed)
        } else {
            Ok(FlipResult::Match)
        }
    }
}
