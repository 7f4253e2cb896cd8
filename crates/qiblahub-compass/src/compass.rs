//! Heading compositor for the compass view.
//!
//! Combines the target bearing with the live device heading into the rotation
//! applied to the on-screen needle.

use std::fmt;

use qiblahub_core::error::DomainError;
use serde::Serialize;
use tracing::{debug, warn};

use crate::geo::{GeoPoint, KAABA, bearing, distance_km};

/// Rotation to apply to the needle for target bearing `bearing` and device
/// heading `alpha` (0 = facing north).
///
/// Not normalized: the result may be negative or exceed 360, and the
/// rendering layer interprets it modulo 360.
#[must_use]
pub fn indicator_rotation(bearing: f64, alpha: f64) -> f64 {
    bearing - alpha
}

/// Device sensor feeding the compass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    /// Position fixes.
    Geolocation,
    /// Heading readings.
    Orientation,
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geolocation => f.write_str("geolocation"),
            Self::Orientation => f.write_str("orientation"),
        }
    }
}

/// What the view renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompassReading {
    /// Bearing from the last position fix to the target, in [0, 360).
    pub bearing: f64,
    /// Rotation currently applied to the needle.
    pub rotation: f64,
    /// Great-circle distance to the target.
    pub distance_km: f64,
}

/// State of one compass view.
#[derive(Debug, Clone)]
pub struct Compass {
    target: GeoPoint,
    reading: Option<CompassReading>,
    notices: Vec<(Sensor, String)>,
}

impl Default for Compass {
    fn default() -> Self {
        Self::new(KAABA)
    }
}

impl Compass {
    /// Creates a compass pointing at `target`.
    #[must_use]
    pub fn new(target: GeoPoint) -> Self {
        Self {
            target,
            reading: None,
            notices: Vec::new(),
        }
    }

    /// The point the needle aims at.
    #[must_use]
    pub fn target(&self) -> GeoPoint {
        self.target
    }

    /// Latest reading, or `None` before the first position fix.
    #[must_use]
    pub fn reading(&self) -> Option<CompassReading> {
        self.reading
    }

    /// Handles a position fix: recomputes the bearing and resets the needle
    /// to the bearing-only rotation.
    pub fn on_position(&mut self, origin: GeoPoint) -> CompassReading {
        let target_bearing = bearing(origin, self.target);
        let reading = CompassReading {
            bearing: target_bearing,
            rotation: target_bearing,
            distance_km: distance_km(origin, self.target),
        };
        debug!(bearing = target_bearing, "position fix applied");
        self.reading = Some(reading);
        reading
    }

    /// Handles a heading reading. An absent (or non-finite) heading leaves the
    /// needle where it is; so does any heading before the first position fix.
    pub fn on_heading(&mut self, alpha: Option<f64>) -> Option<CompassReading> {
        let alpha = alpha.filter(|value| value.is_finite());
        if let (Some(alpha), Some(reading)) = (alpha, self.reading.as_mut()) {
            reading.rotation = indicator_rotation(reading.bearing, alpha);
        }
        self.reading
    }

    /// Records that a sensor was denied or is unsupported, replacing any
    /// earlier notice for the same sensor. The feature degrades to a static
    /// needle; the returned error is meant for a user-visible notice.
    pub fn on_sensor_unavailable(&mut self, sensor: Sensor, reason: &str) -> DomainError {
        warn!(%sensor, reason, "sensor unavailable");
        self.notices.retain(|(noted, _)| *noted != sensor);
        self.notices.push((sensor, reason.to_owned()));
        DomainError::SensorUnavailable(format!("{sensor}: {reason}"))
    }

    /// The latest notice per sensor, least recently reported first.
    #[must_use]
    pub fn notices(&self) -> &[(Sensor, String)] {
        &self.notices
    }
}
