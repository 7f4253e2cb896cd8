//! Per-session context.
//!
//! Bundles the current participant with the store and clock handles. Passed
//! explicitly to whichever component needs store access.

use std::fmt;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::DomainError;
use crate::identity::{IdentityProvider, ParticipantId};
use crate::store::DocumentStore;

/// Explicit session state shared by the realtime features.
#[derive(Clone)]
pub struct SessionContext {
    participant: ParticipantId,
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl SessionContext {
    /// Creates a context for a known participant.
    #[must_use]
    pub fn new(
        participant: ParticipantId,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participant,
            store,
            clock,
        }
    }

    /// Resolves the participant through `identity` and builds a context.
    ///
    /// # Errors
    ///
    /// Propagates any error from the identity provider.
    pub async fn establish(
        identity: &dyn IdentityProvider,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let participant = identity.participant_id().await?;
        Ok(Self::new(participant, store, clock))
    }

    /// The participant this session acts for.
    #[must_use]
    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    /// The document store handle.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// The clock handle.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("participant", &self.participant)
            .finish_non_exhaustive()
    }
}
