//! The arcade games.

pub mod clicker;
pub mod local_tic_tac_toe;
pub mod memory;
pub mod number_guess;
pub mod rock_paper_scissors;
