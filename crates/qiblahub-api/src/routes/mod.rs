//! Route modules, one per feature.

pub mod chat;
pub mod compass;
pub mod games;
pub mod health;
pub mod identity;
pub mod matches;
