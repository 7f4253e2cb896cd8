//! Qibla Hub — multiplayer tic-tac-toe over a shared document store.
//!
//! A match is one document in the `matches` collection. Two participants
//! take seats X and O, and every client keeps a live subscription to the
//! document it plays in.

pub mod application;
pub mod domain;

pub use application::command_handlers::{CreatedMatch, LeaveOutcome, MoveOutcome};
pub use application::coordinator::MatchCoordinator;
pub use application::lobby::MatchLobby;
pub use domain::board::{Board, Mark, Winner};
pub use domain::document::{MatchDocument, MatchStatus, MoveRejection, ParticipantState, Players};
