//! Query handlers for the match coordinator.

use chrono::{DateTime, Utc};
use qiblahub_core::error::DomainError;
use qiblahub_core::identity::ParticipantId;
use qiblahub_core::store::{CollectionSnapshot, DocumentId, DocumentStore, from_fields};
use serde::Serialize;
use tracing::warn;

use crate::application::command_handlers::load_match;
use crate::domain::document::{MatchDocument, MatchStatus};

/// Lobby entry for a match waiting for an opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    /// The match identifier.
    pub match_id: DocumentId,
    /// The participant holding seat 1.
    pub owner: ParticipantId,
    /// When the match was created or last played.
    pub last_move_at: DateTime<Utc>,
}

/// Retrieves a match by its identifier.
///
/// # Errors
///
/// Returns `DomainError::MatchNotFound` if no document exists, or
/// `DomainError::MalformedDocument` / a store error.
pub async fn get_match_by_id(
    match_id: &DocumentId,
    store: &dyn DocumentStore,
) -> Result<MatchDocument, DomainError> {
    load_match(store, match_id).await
}

/// Lists the waiting matches in a collection snapshot, oldest first.
/// Documents that fail to decode are logged and skipped.
#[must_use]
pub fn open_matches(snapshot: CollectionSnapshot) -> Vec<MatchSummary> {
    let mut summaries: Vec<MatchSummary> = snapshot
        .into_iter()
        .filter_map(|stored| match from_fields::<MatchDocument>(stored.data) {
            Ok(document) => Some((stored.id, document)),
            Err(e) => {
                warn!(match_id = %stored.id, error = %e, "skipping malformed match");
                None
            }
        })
        .filter(|(_, document)| document.status == MatchStatus::Waiting)
        .map(|(match_id, document)| MatchSummary {
            match_id,
            owner: document.players.player1_id,
            last_move_at: document.last_move_at,
        })
        .collect();
    summaries.sort_by(|a, b| {
        a.last_move_at
            .cmp(&b.last_move_at)
            .then_with(|| a.match_id.cmp(&b.match_id))
    });
    summaries
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use qiblahub_core::store::Fields;
    use qiblahub_store::MemoryDocumentStore;
    use qiblahub_test_support::{FixedClock, ManualClock};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::application::command_handlers::{
        MATCHES_COLLECTION, handle_create_match, handle_join_match,
    };
    use crate::domain::commands::{CreateMatch, JoinMatch};

    fn participant(name: &str) -> ParticipantId {
        ParticipantId::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_get_match_by_id_returns_not_found_for_missing_match() {
        let store = MemoryDocumentStore::new();

        let result = get_match_by_id(&DocumentId::from("ghost"), &store).await;

        assert!(matches!(result, Err(DomainError::MatchNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_match_by_id_decodes_document() {
        let store = MemoryDocumentStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let command = CreateMatch {
            correlation_id: Uuid::new_v4(),
            owner: participant("alice"),
        };
        let created = handle_create_match(&command, &clock, &store).await.unwrap();

        let document = get_match_by_id(&created.match_id, &store).await.unwrap();

        assert_eq!(document, created.document);
    }

    #[tokio::test]
    async fn test_open_matches_lists_waiting_matches_oldest_first() {
        // Arrange
        let store = MemoryDocumentStore::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let mut ids = Vec::new();
        for owner in ["alice", "bob", "carol"] {
            let command = CreateMatch {
                correlation_id: Uuid::new_v4(),
                owner: participant(owner),
            };
            ids.push(handle_create_match(&command, &clock, &store).await.unwrap().match_id);
            clock.advance(Duration::seconds(1));
        }
        let join = JoinMatch {
            correlation_id: Uuid::new_v4(),
            match_id: ids[1].clone(),
            joiner: participant("dave"),
        };
        handle_join_match(&join, &store).await.unwrap();
        let mut subscription = store.subscribe_to_collection(MATCHES_COLLECTION).await.unwrap();

        // Act
        let open = open_matches(subscription.latest());

        // Assert
        let owners: Vec<&str> = open.iter().map(|summary| summary.owner.as_str()).collect();
        assert_eq!(owners, vec!["alice", "carol"]);
        assert_eq!(open[0].match_id, ids[0]);
    }

    #[tokio::test]
    async fn test_open_matches_skips_malformed_documents() {
        // Arrange
        let store = MemoryDocumentStore::new();
        let mut junk = Fields::new();
        junk.insert("status".to_owned(), json!("waiting"));
        store
            .create_document(MATCHES_COLLECTION, junk)
            .await
            .unwrap();
        let mut subscription = store.subscribe_to_collection(MATCHES_COLLECTION).await.unwrap();

        // Act
        let open = open_matches(subscription.latest());

        // Assert
        assert!(open.is_empty());
    }
}
