//! Chat message documents.

use chrono::{DateTime, Utc};
use qiblahub_core::error::DomainError;
use qiblahub_core::identity::ParticipantId;
use qiblahub_core::store::DocumentId;
use serde::{Deserialize, Serialize};

/// Longest accepted message, in characters after trimming.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// One message as held by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender_id: ParticipantId,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Builds a message from raw input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the trimmed text is empty or
    /// longer than [`MAX_MESSAGE_CHARS`].
    pub fn compose(
        sender_id: ParticipantId,
        raw_text: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation(
                "message text must not be empty".to_owned(),
            ));
        }
        let length = text.chars().count();
        if length > MAX_MESSAGE_CHARS {
            return Err(DomainError::Validation(format!(
                "message text must be at most {MAX_MESSAGE_CHARS} characters, got {length}"
            )));
        }
        Ok(Self {
            sender_id,
            text: text.to_owned(),
            sent_at,
        })
    }
}

/// A stored message together with its document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedMessage {
    pub id: DocumentId,
    #[serde(flatten)]
    pub message: ChatMessage,
}
