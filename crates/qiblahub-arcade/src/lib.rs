//! Qibla Hub — single-device arcade games.
//!
//! Every game is a small state machine holding local state only. Games that
//! need chance take a `DeterministicRng` so tests can script the draws.

pub mod catalog;
pub mod games;

pub use catalog::{GameEntry, catalog, find_game};
