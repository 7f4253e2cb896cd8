//! In-process implementation of the `DocumentStore` trait.
//!
//! Documents live in maps behind a mutex. Each subscribed document and
//! collection gets a `watch` channel that is fed on every write; senders
//! whose receivers have all been dropped are pruned on the next write to
//! any document. A deleted document keeps its sender while someone is still
//! subscribed, so the deletion snapshot is never lost to a closed channel.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use qiblahub_core::error::DomainError;
use qiblahub_core::store::{
    CollectionSnapshot, CollectionSubscription, DocumentId, DocumentSnapshot, DocumentStore,
    DocumentSubscription, Fields, StoredDocument, Subscription,
};

type DocumentKey = (String, DocumentId);

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<DocumentId, Fields>>,
    document_watchers: HashMap<DocumentKey, watch::Sender<DocumentSnapshot>>,
    collection_watchers: HashMap<String, watch::Sender<CollectionSnapshot>>,
}

impl Inner {
    fn document(&self, collection: &str, id: &DocumentId) -> Option<&Fields> {
        self.collections.get(collection).and_then(|docs| docs.get(id))
    }

    fn collection_snapshot(&self, collection: &str) -> CollectionSnapshot {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| StoredDocument {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pushes the current state of `collection/id` to its subscribers.
    fn notify(&mut self, collection: &str, id: &DocumentId) {
        let snapshot = self.document(collection, id).cloned();
        let key = (collection.to_owned(), id.clone());
        if let Some(sender) = self.document_watchers.get(&key) {
            sender.send_replace(snapshot);
        }

        let collection_snapshot = self.collection_snapshot(collection);
        if let Some(sender) = self.collection_watchers.get(collection) {
            sender.send_replace(collection_snapshot);
        }

        self.document_watchers.retain(|_, sender| sender.receiver_count() > 0);
        self.collection_watchers.retain(|_, sender| sender.receiver_count() > 0);
    }
}

/// In-memory document store with realtime subscriptions.
///
/// Document ids are UUIDv7 strings, so ids sort in creation order.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    inner: Mutex<Inner>,
    online: AtomicBool,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    /// Creates an empty, online store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            online: AtomicBool::new(true),
        }
    }

    /// Simulates an outage: while offline every operation fails with
    /// `DomainError::StoreUnavailable`. Existing subscriptions stay open.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of live subscriptions to one document.
    #[must_use]
    pub fn document_subscriber_count(&self, collection: &str, id: &DocumentId) -> usize {
        self.inner.lock().map_or(0, |inner| {
            inner
                .document_watchers
                .get(&(collection.to_owned(), id.clone()))
                .map_or(0, watch::Sender::receiver_count)
        })
    }

    /// Number of live subscriptions to a collection.
    #[must_use]
    pub fn collection_subscriber_count(&self, collection: &str) -> usize {
        self.inner.lock().map_or(0, |inner| {
            inner
                .collection_watchers
                .get(collection)
                .map_or(0, watch::Sender::receiver_count)
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, DomainError> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable("store is offline".to_owned()));
        }
        self.inner
            .lock()
            .map_err(|_| DomainError::StoreUnavailable("store state poisoned".to_owned()))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        data: Fields,
    ) -> Result<DocumentId, DomainError> {
        let id = DocumentId::new(Uuid::now_v7().to_string());
        let mut inner = self.lock()?;
        inner
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.clone(), data);
        inner.notify(collection, &id);
        debug!(collection, %id, "document created");
        Ok(id)
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Fields>, DomainError> {
        let inner = self.lock()?;
        Ok(inner.document(collection, id).cloned())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), DomainError> {
        let mut inner = self.lock()?;
        let document = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| DomainError::DocumentNotFound {
                collection: collection.to_owned(),
                id: id.clone(),
            })?;
        for (key, value) in fields {
            document.insert(key, value);
        }
        inner.notify(collection, id);
        debug!(collection, %id, "document updated");
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &DocumentId) -> Result<(), DomainError> {
        let mut inner = self.lock()?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            inner.notify(collection, id);
            debug!(collection, %id, "document deleted");
        }
        Ok(())
    }

    async fn subscribe_to_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<DocumentSubscription, DomainError> {
        let mut inner = self.lock()?;
        let current = inner.document(collection, id).cloned();
        let sender = inner
            .document_watchers
            .entry((collection.to_owned(), id.clone()))
            .or_insert_with(|| watch::channel(current).0);
        Ok(Subscription::new(sender.subscribe()))
    }

    async fn subscribe_to_collection(
        &self,
        collection: &str,
    ) -> Result<CollectionSubscription, DomainError> {
        let mut inner = self.lock()?;
        let current = inner.collection_snapshot(collection);
        let sender = inner
            .collection_watchers
            .entry(collection.to_owned())
            .or_insert_with(|| watch::channel(current).0);
        Ok(Subscription::new(sender.subscribe()))
    }
}
