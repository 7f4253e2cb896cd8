//! Domain layer for the match coordinator.

pub mod board;
pub mod commands;
pub mod document;
