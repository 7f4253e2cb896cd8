//! Domain layer for the chat room.

pub mod commands;
pub mod message;
