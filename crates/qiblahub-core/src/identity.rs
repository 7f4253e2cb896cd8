//! Participant identity.
//!
//! Identity comes from an external authentication provider. The hub treats it
//! as an opaque string and never inspects its structure.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Opaque, stable identifier of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wraps a provider-issued identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the identifier is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::Validation(
                "participant id must not be blank".to_owned(),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability that yields the current participant's identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the participant bound to this session, issuing one if needed.
    async fn participant_id(&self) -> Result<ParticipantId, DomainError>;
}

/// Identity provider that resumes an existing session id or issues an
/// anonymous one on first use. Once issued, the same id is returned for the
/// lifetime of the provider.
#[derive(Debug, Default)]
pub struct AnonymousIdentityProvider {
    issued: Mutex<Option<ParticipantId>>,
}

impl AnonymousIdentityProvider {
    /// Creates a provider with no session; the first call issues a new id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that resumes `existing`.
    #[must_use]
    pub fn resume(existing: ParticipantId) -> Self {
        Self {
            issued: Mutex::new(Some(existing)),
        }
    }
}

#[async_trait]
impl IdentityProvider for AnonymousIdentityProvider {
    async fn participant_id(&self) -> Result<ParticipantId, DomainError> {
        let mut issued = self
            .issued
            .lock()
            .map_err(|_| DomainError::Validation("identity session poisoned".to_owned()))?;
        let id = issued
            .get_or_insert_with(|| ParticipantId(format!("anon-{}", Uuid::new_v4())))
            .clone();
        Ok(id)
    }
}
