//! Anonymous identity issuance.

use axum::http::HeaderMap;
use axum::{Json, Router, routing::post};
use qiblahub_core::identity::{AnonymousIdentityProvider, IdentityProvider, ParticipantId};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::PARTICIPANT_HEADER;
use crate::state::AppState;

/// Response body for POST /api/v1/identity.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    /// Id to send back in the `x-participant-id` header.
    pub participant_id: ParticipantId,
    /// `true` when a new id was issued rather than an existing one resumed.
    pub issued: bool,
}

/// POST /api/v1/identity
///
/// Resumes the id in `x-participant-id` when present, otherwise issues an
/// anonymous one.
async fn establish_identity(headers: HeaderMap) -> Result<Json<IdentityResponse>, ApiError> {
    let existing = headers
        .get(PARTICIPANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| ParticipantId::new(value).ok());
    let issued = existing.is_none();
    let provider = existing.map_or_else(
        AnonymousIdentityProvider::new,
        AnonymousIdentityProvider::resume,
    );
    let participant_id = provider.participant_id().await?;
    if issued {
        info!(participant = %participant_id, "issued anonymous identity");
    }
    Ok(Json(IdentityResponse {
        participant_id,
        issued,
    }))
}

/// Returns the identity router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/identity", post(establish_identity))
}
