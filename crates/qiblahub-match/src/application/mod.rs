//! Application layer: command and query handlers plus the client-side
//! coordinator.

pub mod command_handlers;
pub mod coordinator;
pub mod lobby;
pub mod query_handlers;
