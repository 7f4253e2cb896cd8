//! Qibla Hub Core — shared kernel.
//!
//! Defines the error type, clock and RNG abstractions, participant identity,
//! the session context, and the document store contract that the realtime
//! features are built on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod identity;
pub mod rng;
pub mod session;
pub mod store;
