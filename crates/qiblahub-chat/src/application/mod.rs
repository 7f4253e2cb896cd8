//! Application layer for the chat room.

pub mod command_handlers;
pub mod feed;
pub mod query_handlers;
