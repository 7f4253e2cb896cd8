//! Domain error types.

use thiserror::Error;

use crate::identity::ParticipantId;
use crate::store::DocumentId;

/// Top-level domain error type.
///
/// No variant is fatal: every failure degrades a single feature view.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Geolocation or orientation input was denied or is unsupported.
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// A create/read/update/delete/subscribe call on the document store failed.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),

    /// A participant tried to join the match they own.
    #[error("cannot join your own match")]
    CannotJoinOwnMatch,

    /// The match document does not exist (never created, or deleted).
    #[error("match not found: {0}")]
    MatchNotFound(DocumentId),

    /// The participant holds no role in the match.
    #[error("participant {0} is not a player in this match")]
    NotAParticipant(ParticipantId),

    /// A partial update targeted a document that does not exist.
    #[error("document not found: {collection}/{id}")]
    DocumentNotFound {
        /// Collection that was addressed.
        collection: String,
        /// Document identifier that was addressed.
        id: DocumentId,
    },

    /// A stored document could not be decoded into its domain shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Caller input failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}
