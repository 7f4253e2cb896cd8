//! Qibla Hub — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use qiblahub_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The document store could not be prepared (e.g. a migration failed).
    #[error("store setup error: {0}")]
    Store(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::MatchNotFound(_) => (StatusCode::NOT_FOUND, "match_not_found"),
            DomainError::DocumentNotFound { .. } => (StatusCode::NOT_FOUND, "document_not_found"),
            DomainError::CannotJoinOwnMatch => (StatusCode::CONFLICT, "cannot_join_own_match"),
            DomainError::NotAParticipant(_) => (StatusCode::FORBIDDEN, "not_a_participant"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::SensorUnavailable(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "sensor_unavailable")
            }
            DomainError::StoreUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
            }
            DomainError::MalformedDocument(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "malformed_document")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Rejection for requests that do not carry a usable participant id.
#[derive(Debug)]
pub struct MissingParticipant;

impl IntoResponse for MissingParticipant {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "missing_participant",
            message: "x-participant-id header is missing or blank".to_owned(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use qiblahub_core::identity::ParticipantId;
    use qiblahub_core::store::DocumentId;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_match_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::MatchNotFound(DocumentId::from("m1"))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_joining_own_match_maps_to_409() {
        assert_eq!(status_of(DomainError::CannotJoinOwnMatch), StatusCode::CONFLICT);
    }

    #[test]
    fn test_not_a_participant_maps_to_403() {
        let stranger = ParticipantId::new("carol").unwrap();
        assert_eq!(
            status_of(DomainError::NotAParticipant(stranger)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        assert_eq!(
            status_of(DomainError::StoreUnavailable("db down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_sensor_and_malformed_map_to_422_and_500() {
        assert_eq!(
            status_of(DomainError::SensorUnavailable("denied".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DomainError::MalformedDocument("bad json".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_participant_maps_to_401() {
        assert_eq!(
            MissingParticipant.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
