//! Qibla bearing endpoint.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use qiblahub_compass::{Compass, CompassReading, GeoPoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /api/v1/compass/qibla.
#[derive(Debug, Deserialize)]
pub struct QiblaQuery {
    /// Device latitude in degrees.
    pub latitude: f64,
    /// Device longitude in degrees.
    pub longitude: f64,
    /// Device heading in degrees (0 = facing north), when the device has one.
    pub heading: Option<f64>,
}

/// Response body for GET /api/v1/compass/qibla.
#[derive(Debug, Serialize)]
pub struct QiblaResponse {
    /// The point the needle aims at.
    pub target: GeoPoint,
    /// Bearing, needle rotation and distance.
    #[serde(flatten)]
    pub reading: CompassReading,
}

/// GET /api/v1/compass/qibla
#[instrument(skip(state))]
async fn qibla(
    State(state): State<AppState>,
    Query(query): Query<QiblaQuery>,
) -> Result<Json<QiblaResponse>, ApiError> {
    let origin = GeoPoint::new(query.latitude, query.longitude)?;
    let mut compass = Compass::new(state.qibla_target);
    let mut reading = compass.on_position(origin);
    if let Some(updated) = compass.on_heading(query.heading) {
        reading = updated;
    }
    debug!(bearing = reading.bearing, "qibla bearing computed");
    Ok(Json(QiblaResponse {
        target: compass.target(),
        reading,
    }))
}

/// Returns the compass router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/compass/qibla", get(qibla))
}
