//! Two players, one device.

use qiblahub_match::{Board, Mark, Winner};
use serde::Serialize;

/// Pass-and-play tic-tac-toe. X always opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTicTacToe {
    board: Board,
    current_player: Mark,
    winner: Winner,
}

impl Default for LocalTicTacToe {
    fn default() -> Self {
        Self {
            board: Board::new(),
            current_player: Mark::X,
            winner: Winner::None,
        }
    }
}

impl LocalTicTacToe {
    /// A fresh game.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    /// The result so far.
    #[must_use]
    pub fn winner(&self) -> Winner {
        self.winner
    }

    /// Marks `cell` for the current player. Returns `false` (and changes
    /// nothing) once the game is decided or if the cell is taken.
    pub fn play(&mut self, cell: usize) -> bool {
        if self.winner.is_decided() {
            return false;
        }
        let mark = self.current_player;
        if !self.board.place(cell, mark) {
            return false;
        }
        self.winner = self.board.winner();
        self.current_player = mark.opponent();
        true
    }

    /// Clears the board for a rematch.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
