//! Qibla Hub — realtime chat room.
//!
//! Messages are documents in the `chatMessages` collection; readers see the
//! most recent ones through a collection subscription.

pub mod application;
pub mod domain;

pub use application::feed::ChatFeed;
pub use domain::message::{ChatMessage, PostedMessage};
