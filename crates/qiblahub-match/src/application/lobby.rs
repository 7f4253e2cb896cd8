//! Live list of matches waiting for an opponent.

use qiblahub_core::error::DomainError;
use qiblahub_core::store::{CollectionSubscription, DocumentStore};

use crate::application::command_handlers::MATCHES_COLLECTION;
use crate::application::query_handlers::{MatchSummary, open_matches};

/// Long-lived subscription to the `matches` collection. Readers share it
/// through `open_matches`; dropping the lobby unsubscribes.
#[derive(Debug)]
pub struct MatchLobby {
    subscription: CollectionSubscription,
}

impl MatchLobby {
    /// Subscribes to the matches collection.
    ///
    /// # Errors
    ///
    /// Returns a store error if the subscription cannot be opened.
    pub async fn open(store: &dyn DocumentStore) -> Result<Self, DomainError> {
        let subscription = store.subscribe_to_collection(MATCHES_COLLECTION).await?;
        Ok(Self { subscription })
    }

    /// Waiting matches in the latest snapshot, oldest first.
    #[must_use]
    pub fn open_matches(&self) -> Vec<MatchSummary> {
        open_matches(self.subscription.current())
    }

    /// Waits for the collection to change and returns the new lobby.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the store closed the feed.
    pub async fn next(&mut self) -> Result<Vec<MatchSummary>, DomainError> {
        let snapshot = self.subscription.next().await?;
        Ok(open_matches(snapshot))
    }
}
