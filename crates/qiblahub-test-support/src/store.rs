//! Test stores — `DocumentStore` doubles for failure paths.

use std::sync::Arc;

use async_trait::async_trait;
use qiblahub_core::error::DomainError;
use qiblahub_core::store::{
    CollectionSubscription, DocumentId, DocumentStore, DocumentSubscription, Fields, Subscription,
};
use tokio::sync::watch;

fn unavailable() -> DomainError {
    DomainError::StoreUnavailable("connection refused".into())
}

/// A document store whose every operation fails with
/// `DomainError::StoreUnavailable`.
#[derive(Debug)]
pub struct FailingDocumentStore;

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn create_document(
        &self,
        _collection: &str,
        _data: Fields,
    ) -> Result<DocumentId, DomainError> {
        Err(unavailable())
    }

    async fn get_document(
        &self,
        _collection: &str,
        _id: &DocumentId,
    ) -> Result<Option<Fields>, DomainError> {
        Err(unavailable())
    }

    async fn update_document(
        &self,
        _collection: &str,
        _id: &DocumentId,
        _fields: Fields,
    ) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn delete_document(&self, _collection: &str, _id: &DocumentId) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn subscribe_to_document(
        &self,
        _collection: &str,
        _id: &DocumentId,
    ) -> Result<DocumentSubscription, DomainError> {
        Err(unavailable())
    }

    async fn subscribe_to_collection(
        &self,
        _collection: &str,
    ) -> Result<CollectionSubscription, DomainError> {
        Err(unavailable())
    }
}

/// Wraps a working store, but every subscription it hands out is already
/// closed: it carries the snapshot current at subscribe time and nothing
/// after. Reads and writes go to the wrapped store.
pub struct ClosedFeedStore(pub Arc<dyn DocumentStore>);

impl std::fmt::Debug for ClosedFeedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosedFeedStore").finish_non_exhaustive()
    }
}

fn closed<T: Clone>(mut live: Subscription<T>) -> Subscription<T> {
    let (tx, rx) = watch::channel(live.latest());
    drop(tx);
    Subscription::new(rx)
}

#[async_trait]
impl DocumentStore for ClosedFeedStore {
    async fn create_document(
        &self,
        collection: &str,
        data: Fields,
    ) -> Result<DocumentId, DomainError> {
        self.0.create_document(collection, data).await
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Fields>, DomainError> {
        self.0.get_document(collection, id).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), DomainError> {
        self.0.update_document(collection, id, fields).await
    }

    async fn delete_document(&self, collection: &str, id: &DocumentId) -> Result<(), DomainError> {
        self.0.delete_document(collection, id).await
    }

    async fn subscribe_to_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<DocumentSubscription, DomainError> {
        Ok(closed(self.0.subscribe_to_document(collection, id).await?))
    }

    async fn subscribe_to_collection(
        &self,
        collection: &str,
    ) -> Result<CollectionSubscription, DomainError> {
        Ok(closed(self.0.subscribe_to_collection(collection).await?))
    }
}
