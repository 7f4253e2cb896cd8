//! `PostgreSQL` implementation of the `DocumentStore` trait.
//!
//! Documents are rows of a JSONB table keyed by `(collection, id)`. A row
//! trigger announces every change on [`CHANGE_CHANNEL`]; each subscription
//! runs a listener task that re-reads the affected document or collection and
//! pushes it into a `watch` channel. Dropping the subscription aborts the task.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use qiblahub_core::error::DomainError;
use qiblahub_core::store::{
    CollectionSnapshot, CollectionSubscription, DocumentId, DocumentSnapshot, DocumentStore,
    DocumentSubscription, Fields, StoredDocument, Subscription,
};

/// Notification channel written by the `documents_notify_change` trigger.
pub const CHANGE_CHANNEL: &str = "qiblahub_documents";

/// Payload of a change notification.
#[derive(Debug, Deserialize, PartialEq)]
struct ChangeNotice {
    collection: String,
    id: String,
}

impl ChangeNotice {
    fn parse(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }

    fn concerns(&self, collection: &str, id: Option<&DocumentId>) -> bool {
        self.collection == collection && id.is_none_or(|id| self.id == id.as_str())
    }
}

#[allow(clippy::needless_pass_by_value)]
fn store_error(err: sqlx::Error) -> DomainError {
    DomainError::StoreUnavailable(err.to_string())
}

fn into_fields(value: Value) -> Result<Fields, DomainError> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(DomainError::MalformedDocument(format!(
            "stored document is not an object: {other}"
        ))),
    }
}

async fn load_document(
    pool: &PgPool,
    collection: &str,
    id: &DocumentId,
) -> Result<DocumentSnapshot, DomainError> {
    let data: Option<Value> =
        sqlx::query_scalar("SELECT data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_str())
            .fetch_optional(pool)
            .await
            .map_err(store_error)?;
    data.map(into_fields).transpose()
}

async fn load_collection(pool: &PgPool, collection: &str) -> Result<CollectionSnapshot, DomainError> {
    let rows: Vec<(String, Value)> =
        sqlx::query_as("SELECT id, data FROM documents WHERE collection = $1 ORDER BY id")
            .bind(collection)
            .fetch_all(pool)
            .await
            .map_err(store_error)?;
    rows.into_iter()
        .map(|(id, data)| {
            Ok(StoredDocument {
                id: DocumentId::new(id),
                data: into_fields(data)?,
            })
        })
        .collect()
}

/// PostgreSQL-backed document store.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if a migration fails.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::StoreUnavailable(format!("migration failed: {e}")))
    }

    async fn listen(&self) -> Result<PgListener, DomainError> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(store_error)?;
        listener.listen(CHANGE_CHANNEL).await.map_err(store_error)?;
        Ok(listener)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        data: Fields,
    ) -> Result<DocumentId, DomainError> {
        let id = DocumentId::new(Uuid::now_v7().to_string());
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id.as_str())
            .bind(Value::Object(data))
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        debug!(collection, %id, "document created");
        Ok(id)
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Fields>, DomainError> {
        load_document(&self.pool, collection, id).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = NOW() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id.as_str())
        .bind(Value::Object(fields))
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::DocumentNotFound {
                collection: collection.to_owned(),
                id: id.clone(),
            });
        }
        debug!(collection, %id, "document updated");
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &DocumentId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        debug!(collection, %id, "document deleted");
        Ok(())
    }

    async fn subscribe_to_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<DocumentSubscription, DomainError> {
        // Listen before the initial read so no change falls in between.
        let mut listener = self.listen().await?;
        let initial = load_document(&self.pool, collection, id).await?;
        let (tx, rx) = watch::channel(initial);

        let pool = self.pool.clone();
        let collection = collection.to_owned();
        let id = id.clone();
        let task = tokio::spawn(async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(notification) => notification,
                    Err(e) => {
                        warn!(error = %e, %collection, %id, "document listener stopped");
                        break;
                    }
                };
                let concerns = ChangeNotice::parse(notification.payload())
                    .is_some_and(|notice| notice.concerns(&collection, Some(&id)));
                if !concerns {
                    continue;
                }
                match load_document(&pool, &collection, &id).await {
                    Ok(snapshot) => {
                        if tx.send(snapshot).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, %collection, %id, "document reload failed"),
                }
            }
        });

        Ok(Subscription::with_cleanup(rx, move || task.abort()))
    }

    async fn subscribe_to_collection(
        &self,
        collection: &str,
    ) -> Result<CollectionSubscription, DomainError> {
        let mut listener = self.listen().await?;
        let initial = load_collection(&self.pool, collection).await?;
        let (tx, rx) = watch::channel(initial);

        let pool = self.pool.clone();
        let collection = collection.to_owned();
        let task = tokio::spawn(async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(notification) => notification,
                    Err(e) => {
                        warn!(error = %e, %collection, "collection listener stopped");
                        break;
                    }
                };
                let concerns = ChangeNotice::parse(notification.payload())
                    .is_some_and(|notice| notice.concerns(&collection, None));
                if !concerns {
                    continue;
                }
                match load_collection(&pool, &collection).await {
                    Ok(snapshot) => {
                        if tx.send(snapshot).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, %collection, "collection reload failed"),
                }
            }
        });

        Ok(Subscription::with_cleanup(rx, move || task.abort()))
    }
}
