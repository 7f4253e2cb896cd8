//! Shared test doubles for the Qibla Hub crates.

mod clock;
mod rng;
mod store;

pub use clock::{FixedClock, ManualClock};
pub use rng::{MockRng, SequenceRng};
pub use store::{ClosedFeedStore, FailingDocumentStore};
