//! The 3×3 board and its line scan.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// The eight winning lines: three rows, three columns, two diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A player's mark, which is also their role in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Always player 1; moves first.
    X,
    /// Always player 2.
    O,
}

impl Mark {
    /// The other mark.
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X"),
            Self::O => f.write_str("O"),
        }
    }
}

/// Result of the line scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// Undecided.
    #[default]
    #[serde(rename = "none")]
    None,
    /// X completed a line.
    X,
    /// O completed a line.
    O,
    /// Full board, no line.
    Draw,
}

impl Winner {
    /// `true` once the game is decided (a line or a draw).
    #[must_use]
    pub fn is_decided(self) -> bool {
        self != Self::None
    }
}

impl From<Mark> for Winner {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Self::X,
            Mark::O => Self::O,
        }
    }
}

/// Nine cells in row-major order; `None` is an empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Option<Mark>; CELL_COUNT]);

impl Board {
    /// An empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A board with the given cells.
    #[must_use]
    pub fn from_cells(cells: [Option<Mark>; CELL_COUNT]) -> Self {
        Self(cells)
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Option<Mark>; CELL_COUNT] {
        &self.0
    }

    /// The cell at `index`, or `None` if out of range or empty.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Mark> {
        self.0.get(index).copied().flatten()
    }

    /// `true` if `index` is on the board and empty.
    #[must_use]
    pub fn is_open(&self, index: usize) -> bool {
        matches!(self.0.get(index), Some(None))
    }

    /// `true` when every cell holds a mark.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Writes `mark` into an open cell. Returns `false` (and leaves the board
    /// untouched) if the cell is occupied or out of range.
    pub fn place(&mut self, index: usize, mark: Mark) -> bool {
        if !self.is_open(index) {
            return false;
        }
        self.0[index] = Some(mark);
        true
    }

    /// Scans the eight lines. A line wins when its three cells hold the same
    /// mark; failing that a full board is a draw.
    #[must_use]
    pub fn winner(&self) -> Winner {
        for [a, b, c] in WINNING_LINES {
            if let Some(mark) = self.0[a] {
                if self.0[b] == Some(mark) && self.0[c] == Some(mark) {
                    return mark.into();
                }
            }
        }
        if self.is_full() {
            Winner::Draw
        } else {
            Winner::None
        }
    }
}
