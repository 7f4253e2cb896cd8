//! Document store abstraction.
//!
//! The hub's shared state lives in an external realtime document store. The
//! core consumes it through six operations: create, get, update (shallow
//! merge), delete, and subscriptions to a single document or a whole
//! collection.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::error::DomainError;

/// Store-assigned document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Field map of a document. Documents are always JSON objects.
pub type Fields = Map<String, Value>;

/// A document together with its identifier, as delivered in collection
/// snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document identifier.
    pub id: DocumentId,
    /// Document contents.
    pub data: Fields,
}

/// Snapshot of one document; `None` once the document is absent or deleted.
pub type DocumentSnapshot = Option<Fields>;

/// Snapshot of every document in a collection, ordered by document id.
pub type CollectionSnapshot = Vec<StoredDocument>;

/// Live view of a document or collection.
///
/// Holds the latest snapshot pushed by the store. Dropping the subscription
/// unsubscribes: the store stops delivering to it and any adapter resources
/// (listener tasks, channels) are released.
pub struct Subscription<T> {
    receiver: watch::Receiver<T>,
    on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl<T: Clone> Subscription<T> {
    /// Wraps a watch receiver; nothing extra runs on drop.
    #[must_use]
    pub fn new(receiver: watch::Receiver<T>) -> Self {
        Self {
            receiver,
            on_drop: None,
        }
    }

    /// Wraps a watch receiver and runs `on_drop` when the subscription ends.
    #[must_use]
    pub fn with_cleanup(
        receiver: watch::Receiver<T>,
        on_drop: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            receiver,
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// Returns the latest snapshot without waiting and marks it as seen.
    pub fn latest(&mut self) -> T {
        self.receiver.borrow_and_update().clone()
    }

    /// Returns the latest snapshot without marking it as seen, so shared
    /// readers can peek at a long-lived subscription.
    #[must_use]
    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Returns `true` if a snapshot arrived that has not been read yet.
    ///
    /// A final snapshot sent just before the store closed the feed is still
    /// reported as pending.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the store closed the feed
    /// and nothing unread is left.
    pub fn has_changed(&self) -> Result<bool, DomainError> {
        match self.receiver.has_changed() {
            Ok(changed) => Ok(changed),
            Err(_) if self.receiver.borrow().has_changed() => Ok(true),
            Err(_) => Err(DomainError::StoreUnavailable(
                "subscription closed by store".to_owned(),
            )),
        }
    }

    /// Waits for the next snapshot pushed by the store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the store closed the feed.
    pub async fn next(&mut self) -> Result<T, DomainError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| DomainError::StoreUnavailable("subscription closed by store".to_owned()))?;
        Ok(self.latest())
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.on_drop.take() {
            cleanup();
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("has_cleanup", &self.on_drop.is_some())
            .finish_non_exhaustive()
    }
}

/// Subscription to a single document.
pub type DocumentSubscription = Subscription<DocumentSnapshot>;

/// Subscription to a whole collection.
pub type CollectionSubscription = Subscription<CollectionSnapshot>;

/// Asynchronous key-value-with-subscriptions store.
///
/// Every operation may fail with `DomainError::StoreUnavailable`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document and returns its store-assigned id.
    async fn create_document(&self, collection: &str, data: Fields)
    -> Result<DocumentId, DomainError>;

    /// Reads a document; `Ok(None)` if it does not exist.
    async fn get_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Fields>, DomainError>;

    /// Merges `fields` into the top level of an existing document.
    ///
    /// Fails with `DomainError::DocumentNotFound` if the document is absent.
    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), DomainError>;

    /// Deletes a document. Deleting an absent document succeeds.
    async fn delete_document(&self, collection: &str, id: &DocumentId) -> Result<(), DomainError>;

    /// Subscribes to one document. The first snapshot is available
    /// immediately via [`Subscription::latest`].
    async fn subscribe_to_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<DocumentSubscription, DomainError>;

    /// Subscribes to every document in a collection.
    async fn subscribe_to_collection(
        &self,
        collection: &str,
    ) -> Result<CollectionSubscription, DomainError>;
}

/// Converts a serializable value into document fields.
///
/// # Errors
///
/// Returns `DomainError::MalformedDocument` if the value does not serialize
/// to a JSON object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, DomainError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(DomainError::MalformedDocument(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(DomainError::MalformedDocument(e.to_string())),
    }
}

/// Decodes document fields into a domain type.
///
/// # Errors
///
/// Returns `DomainError::MalformedDocument` if the fields do not match `T`.
pub fn from_fields<T: serde::de::DeserializeOwned>(fields: Fields) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| DomainError::MalformedDocument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use serde_json::json;

    use super::*;

    #[test]
    fn test_dropping_subscription_runs_cleanup_once() {
        // Arrange
        let (_tx, rx) = watch::channel(0_u32);
        let cleaned = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cleaned);
        let subscription = Subscription::with_cleanup(rx, move || flag.store(true, Ordering::SeqCst));

        // Act
        drop(subscription);

        // Assert
        assert!(cleaned.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_next_returns_pushed_snapshot() {
        let (tx, rx) = watch::channel(1_u32);
        let mut subscription = Subscription::new(rx);
        assert_eq!(subscription.latest(), 1);

        tx.send_replace(2);

        assert!(subscription.has_changed().unwrap());
        assert_eq!(subscription.next().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_final_snapshot_is_pending_after_sender_dropped() {
        // Arrange
        let (tx, rx) = watch::channel(Some(1_u32));
        let mut subscription = Subscription::new(rx);
        subscription.latest();

        // Act
        tx.send_replace(None);
        drop(tx);

        // Assert
        assert!(subscription.has_changed().unwrap());
        assert_eq!(subscription.latest(), None);
        assert!(matches!(
            subscription.has_changed(),
            Err(DomainError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn test_current_does_not_mark_snapshot_seen() {
        let (tx, rx) = watch::channel(1_u32);
        let subscription = Subscription::new(rx);
        tx.send_replace(2);

        assert_eq!(subscription.current(), 2);
        assert!(subscription.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_next_reports_store_unavailable_when_sender_dropped() {
        let (tx, rx) = watch::channel(1_u32);
        let mut subscription = Subscription::new(rx);
        drop(tx);

        let result = subscription.next().await;

        assert!(matches!(result, Err(DomainError::StoreUnavailable(_))));
    }

    #[test]
    fn test_to_fields_rejects_non_object_values() {
        let result = to_fields(&json!([1, 2, 3]));
        assert!(matches!(result, Err(DomainError::MalformedDocument(_))));
    }
}
