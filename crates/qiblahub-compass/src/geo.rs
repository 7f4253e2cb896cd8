//! Spherical-earth geometry: initial bearing and great-circle distance.

use qiblahub_core::error::DomainError;
use serde::Serialize;

/// Mean earth radius used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Location of the Kaaba in Mecca.
pub const KAABA: GeoPoint = GeoPoint {
    latitude: 21.4225,
    longitude: 39.8262,
};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Builds a point from sensor input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either coordinate is not finite,
    /// latitude is outside [-90, 90], or longitude is outside [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::Validation(format!(
                "latitude must be within [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::Validation(format!(
                "longitude must be within [-180, 180], got {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Initial great-circle bearing (forward azimuth) from `origin` to `target`,
/// in degrees clockwise from true north, normalized into [0, 360).
///
/// Identical points give 0, since `atan2(0, 0) = 0`.
#[must_use]
pub fn bearing(origin: GeoPoint, target: GeoPoint) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = target.latitude.to_radians();
    let delta_lon = (target.longitude - origin.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Bearing from `origin` to the Kaaba.
#[must_use]
pub fn qibla_bearing(origin: GeoPoint) -> f64 {
    bearing(origin, KAABA)
}

/// Haversine great-circle distance in kilometres.
#[must_use]
pub fn distance_km(origin: GeoPoint, target: GeoPoint) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = target.latitude.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lon = (target.longitude - origin.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}
