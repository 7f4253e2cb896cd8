//! Qibla Hub — compass.
//!
//! Computes the initial great-circle bearing from the device's position to a
//! target (the Kaaba by default) and composes it with the live device heading
//! into a needle rotation.

pub mod compass;
pub mod geo;

pub use compass::{Compass, CompassReading, Sensor, indicator_rotation};
pub use geo::{GeoPoint, KAABA, bearing, distance_km, qibla_bearing};
