//! Live chat feed.

use qiblahub_core::error::DomainError;
use qiblahub_core::store::{CollectionSubscription, DocumentStore};

use crate::application::command_handlers::CHAT_COLLECTION;
use crate::application::query_handlers::{DEFAULT_RECENT_LIMIT, latest_messages};
use crate::domain::message::PostedMessage;

/// Subscription to the chat room yielding the ordered recent messages on
/// every change. One feed can serve any number of readers through
/// `current` and `recent`. Dropping the feed unsubscribes.
#[derive(Debug)]
pub struct ChatFeed {
    subscription: CollectionSubscription,
    limit: usize,
}

impl ChatFeed {
    /// Subscribes to the chat room, keeping the last `limit` messages
    /// (default 50).
    ///
    /// # Errors
    ///
    /// Returns a store error if the subscription cannot be opened.
    pub async fn open(store: &dyn DocumentStore, limit: Option<usize>) -> Result<Self, DomainError> {
        let subscription = store.subscribe_to_collection(CHAT_COLLECTION).await?;
        Ok(Self {
            subscription,
            limit: limit.unwrap_or(DEFAULT_RECENT_LIMIT),
        })
    }

    /// The messages in the latest snapshot.
    #[must_use]
    pub fn current(&self) -> Vec<PostedMessage> {
        latest_messages(self.subscription.current(), self.limit)
    }

    /// The last `limit` messages in the latest snapshot, falling back to the
    /// feed's own limit.
    #[must_use]
    pub fn recent(&self, limit: Option<usize>) -> Vec<PostedMessage> {
        latest_messages(self.subscription.current(), limit.unwrap_or(self.limit))
    }

    /// Waits for the room to change and returns the new message list.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the store closed the feed.
    pub async fn next(&mut self) -> Result<Vec<PostedMessage>, DomainError> {
        let snapshot = self.subscription.next().await?;
        Ok(latest_messages(snapshot, self.limit))
    }
}
