//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use qiblahub_core::identity::ParticipantId;

use crate::error::MissingParticipant;

/// Header carrying the caller's participant id.
pub const PARTICIPANT_HEADER: &str = "x-participant-id";

/// The calling participant, taken from the `x-participant-id` header.
#[derive(Debug, Clone)]
pub struct Participant(pub ParticipantId);

impl<S> FromRequestParts<S> for Participant
where
    S: Send + Sync,
{
    type Rejection = MissingParticipant;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(PARTICIPANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(MissingParticipant)?;
        ParticipantId::new(value)
            .map(Self)
            .map_err(|_| MissingParticipant)
    }
}
