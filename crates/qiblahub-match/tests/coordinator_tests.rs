//! End-to-end match scenarios: two coordinators sharing one in-memory store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use qiblahub_core::clock::Clock;
use qiblahub_core::error::DomainError;
use qiblahub_core::identity::ParticipantId;
use qiblahub_core::session::SessionContext;
use qiblahub_core::store::{DocumentStore, Fields};
use qiblahub_match::application::command_handlers::{
    MATCHES_COLLECTION, handle_join_match, handle_leave_match,
};
use qiblahub_match::domain::commands::{JoinMatch, LeaveMatch};
use qiblahub_match::{
    MatchCoordinator, MatchStatus, Mark, MoveOutcome, MoveRejection, ParticipantState, Winner,
};
use qiblahub_store::MemoryDocumentStore;
use qiblahub_test_support::{ClosedFeedStore, FixedClock};
use serde_json::json;
use uuid::Uuid;

fn coordinator(name: &str, store: &Arc<MemoryDocumentStore>) -> MatchCoordinator {
    let store: Arc<dyn DocumentStore> = store.clone();
    coordinator_over(name, store)
}

fn coordinator_over(name: &str, store: Arc<dyn DocumentStore>) -> MatchCoordinator {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ));
    MatchCoordinator::new(SessionContext::new(
        ParticipantId::new(name).unwrap(),
        store,
        clock,
    ))
}

async fn started_match(
    store: &Arc<MemoryDocumentStore>,
) -> (MatchCoordinator, MatchCoordinator) {
    let mut alice = coordinator("alice", store);
    let mut bob = coordinator("bob", store);
    let match_id = alice.create_match().await.unwrap();
    bob.join_match(&match_id).await.unwrap();
    alice.sync().unwrap();
    (alice, bob)
}

#[tokio::test]
async fn test_create_join_and_first_move() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let mut alice = coordinator("alice", &store);
    let mut bob = coordinator("bob", &store);

    // Act: alice creates
    let match_id = alice.create_match().await.unwrap();

    // Assert
    assert_eq!(alice.state(), ParticipantState::LobbyWaiting);
    assert_eq!(alice.document().unwrap().players.player2_id, None);
    assert_eq!(alice.my_role(), Some(Mark::X));

    // Act: bob joins
    bob.join_match(&match_id).await.unwrap();
    let changed = alice.sync().unwrap();

    // Assert
    assert!(changed);
    assert_eq!(bob.state(), ParticipantState::InProgress);
    assert_eq!(bob.my_role(), Some(Mark::O));
    assert_eq!(alice.state(), ParticipantState::InProgress);

    // Act: alice plays cell 0
    let outcome = alice.submit_move(0).await.unwrap();

    // Assert
    assert!(matches!(outcome, MoveOutcome::Accepted(_)));
    let document = alice.document().unwrap();
    assert_eq!(document.board.get(0), Some(Mark::X));
    assert_eq!(document.current_player, Mark::O);

    // Act: alice tries again out of turn
    let before = alice.document().unwrap().clone();
    let outcome = alice.submit_move(1).await.unwrap();

    // Assert
    assert_eq!(outcome, MoveOutcome::Rejected(MoveRejection::NotYourTurn));
    assert_eq!(alice.document().unwrap(), &before);
}

#[tokio::test]
async fn test_owner_cannot_join_own_match() {
    let store = Arc::new(MemoryDocumentStore::new());
    let mut alice = coordinator("alice", &store);
    let match_id = alice.create_match().await.unwrap();

    let result = alice.join_match(&match_id).await;

    assert!(matches!(result, Err(DomainError::CannotJoinOwnMatch)));
    assert_eq!(alice.match_id(), Some(&match_id));
    assert_eq!(alice.state(), ParticipantState::LobbyWaiting);
}

#[tokio::test]
async fn test_last_joiner_takes_seat_two() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let (alice, mut bob) = started_match(&store).await;
    let mut carol = coordinator("carol", &store);
    let match_id = alice.match_id().unwrap().clone();

    // Act
    carol.join_match(&match_id).await.unwrap();
    bob.sync().unwrap();

    // Assert
    assert_eq!(carol.my_role(), Some(Mark::O));
    assert_eq!(carol.state(), ParticipantState::InProgress);
    assert_eq!(bob.state(), ParticipantState::NoMatch);
    assert_eq!(store.document_subscriber_count(MATCHES_COLLECTION, &match_id), 3);
}

#[tokio::test]
async fn test_sole_player_leaving_deletes_match() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let mut alice = coordinator("alice", &store);
    let match_id = alice.create_match().await.unwrap();

    // Act
    alice.leave_match().await.unwrap();

    // Assert
    assert!(
        store
            .get_document(MATCHES_COLLECTION, &match_id)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(alice.state(), ParticipantState::NoMatch);
    assert_eq!(store.document_subscriber_count(MATCHES_COLLECTION, &match_id), 0);
}

#[tokio::test]
async fn test_owner_leaving_promotes_opponent_to_x() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let (mut alice, mut bob) = started_match(&store).await;

    // Act
    alice.leave_match().await.unwrap();
    let update = bob.next_update().await.unwrap().cloned();

    // Assert
    let document = update.unwrap();
    assert_eq!(document.players.player1_id.as_str(), "bob");
    assert_eq!(document.status, MatchStatus::Waiting);
    assert_eq!(bob.my_role(), Some(Mark::X));
    assert_eq!(bob.state(), ParticipantState::LobbyWaiting);
    assert_eq!(alice.match_id(), None);
}

#[tokio::test]
async fn test_line_of_three_finishes_match() {
    // Arrange: drive the board to X X X / _ O O / _ _ _.
    let store = Arc::new(MemoryDocumentStore::new());
    let (mut alice, mut bob) = started_match(&store).await;

    // Act
    for (turn, cell) in [0, 4, 1, 5, 2].into_iter().enumerate() {
        let mover = if turn % 2 == 0 { &mut alice } else { &mut bob };
        mover.sync().unwrap();
        let outcome = mover.submit_move(cell).await.unwrap();
        assert!(matches!(outcome, MoveOutcome::Accepted(_)), "ply {turn}");
    }
    bob.sync().unwrap();

    // Assert
    let document = bob.document().unwrap();
    assert_eq!(document.winner, Winner::X);
    assert_eq!(document.status, MatchStatus::Finished);
    assert_eq!(bob.state(), ParticipantState::Finished);
    assert_eq!(
        bob.submit_move(8).await.unwrap(),
        MoveOutcome::Rejected(MoveRejection::NotInProgress)
    );
}

#[tokio::test]
async fn test_nine_alternating_moves_without_line_end_in_draw() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let (mut alice, mut bob) = started_match(&store).await;

    // Act
    for (turn, cell) in [0, 1, 2, 4, 3, 5, 7, 6, 8].into_iter().enumerate() {
        let mover = if turn % 2 == 0 { &mut alice } else { &mut bob };
        mover.sync().unwrap();
        mover.submit_move(cell).await.unwrap();
    }

    // Assert
    let document = alice.document().unwrap();
    assert_eq!(document.winner, Winner::Draw);
    assert_eq!(document.status, MatchStatus::Finished);
}

#[tokio::test]
async fn test_moves_are_validated_against_the_cached_snapshot() {
    // Arrange: bob has not seen alice's move yet.
    let store = Arc::new(MemoryDocumentStore::new());
    let (mut alice, mut bob) = started_match(&store).await;
    alice.submit_move(0).await.unwrap();

    // Act
    let stale = bob.submit_move(4).await.unwrap();
    let fresh = bob.submit_move(4).await.unwrap();

    // Assert: the stale check refuses, then the synced cache accepts.
    assert_eq!(stale, MoveOutcome::Rejected(MoveRejection::NotYourTurn));
    assert!(matches!(fresh, MoveOutcome::Accepted(_)));
}

#[tokio::test]
async fn test_store_failure_leaves_local_view_unchanged() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let (mut alice, _bob) = started_match(&store).await;
    let before = alice.document().unwrap().clone();
    store.set_online(false);

    // Act
    let result = alice.submit_move(0).await;

    // Assert
    assert!(matches!(result, Err(DomainError::StoreUnavailable(_))));
    assert_eq!(alice.document().unwrap(), &before);
    assert_eq!(alice.state(), ParticipantState::InProgress);
}

#[tokio::test]
async fn test_failed_leave_keeps_subscription() {
    let store = Arc::new(MemoryDocumentStore::new());
    let (mut alice, _bob) = started_match(&store).await;
    let match_id = alice.match_id().unwrap().clone();
    store.set_online(false);

    let result = alice.leave_match().await;

    assert!(matches!(result, Err(DomainError::StoreUnavailable(_))));
    assert_eq!(alice.match_id(), Some(&match_id));
}

#[tokio::test]
async fn test_reset_starts_new_game_even_with_one_player() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let (mut alice, mut bob) = started_match(&store).await;
    alice.submit_move(4).await.unwrap();
    bob.leave_match().await.unwrap();
    alice.sync().unwrap();

    // Act
    alice.reset_match().await.unwrap();

    // Assert
    let document = alice.document().unwrap();
    assert!(document.board.cells().iter().all(Option::is_none));
    assert_eq!(document.status, MatchStatus::InProgress);
    assert_eq!(document.players.player2_id, None);
}

#[tokio::test]
async fn test_switching_and_dropping_release_subscriptions() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let mut alice = coordinator("alice", &store);
    let first = alice.create_match().await.unwrap();
    assert_eq!(store.document_subscriber_count(MATCHES_COLLECTION, &first), 1);

    // Act: a second match replaces the first subscription
    let second = alice.create_match().await.unwrap();

    // Assert
    assert_eq!(store.document_subscriber_count(MATCHES_COLLECTION, &first), 0);
    assert_eq!(store.document_subscriber_count(MATCHES_COLLECTION, &second), 1);

    // Act: dropping the coordinator releases the rest
    drop(alice);

    // Assert
    assert_eq!(store.document_subscriber_count(MATCHES_COLLECTION, &second), 0);
}

#[tokio::test]
async fn test_malformed_snapshot_keeps_previous_cache() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let mut alice = coordinator("alice", &store);
    let match_id = alice.create_match().await.unwrap();
    let before = alice.document().unwrap().clone();
    let mut garbage = Fields::new();
    garbage.insert("board".to_owned(), json!("not a board"));
    store
        .update_document(MATCHES_COLLECTION, &match_id, garbage)
        .await
        .unwrap();

    // Act
    let result = alice.sync();

    // Assert
    assert!(matches!(result, Err(DomainError::MalformedDocument(_))));
    assert_eq!(alice.document().unwrap(), &before);
}

#[tokio::test]
async fn test_remote_deletion_moves_participant_to_no_match() {
    // Arrange
    let store = Arc::new(MemoryDocumentStore::new());
    let mut alice = coordinator("alice", &store);
    let match_id = alice.create_match().await.unwrap();
    let command = LeaveMatch {
        correlation_id: Uuid::new_v4(),
        match_id: match_id.clone(),
        leaver: ParticipantId::new("alice").unwrap(),
    };

    // Act: the match is deleted from another client
    handle_leave_match(&command, store.as_ref()).await.unwrap();
    let changed = alice.sync();

    // Assert
    assert!(matches!(changed, Ok(true)));
    assert!(alice.document().is_none());
    assert_eq!(alice.state(), ParticipantState::NoMatch);
}

#[tokio::test]
async fn test_stored_move_is_reported_when_feed_read_fails() {
    // Arrange: bob's coordinator only ever sees the snapshot it subscribed to.
    let store = Arc::new(MemoryDocumentStore::new());
    let mut alice = coordinator("alice", &store);
    let match_id = alice.create_match().await.unwrap();
    let join = JoinMatch {
        correlation_id: Uuid::new_v4(),
        match_id: match_id.clone(),
        joiner: ParticipantId::new("bob").unwrap(),
    };
    handle_join_match(&join, store.as_ref()).await.unwrap();
    alice.sync().unwrap();
    alice.submit_move(0).await.unwrap();
    let shared: Arc<dyn DocumentStore> = store.clone();
    let mut bob = coordinator_over("bob", Arc::new(ClosedFeedStore(shared)));
    bob.join_match(&match_id).await.unwrap();

    // Act
    let outcome = bob.submit_move(4).await;
    alice.sync().unwrap();
    let after_move = alice.document().unwrap().clone();
    let reset = bob.reset_match().await;
    alice.sync().unwrap();

    // Assert
    assert!(matches!(outcome, Ok(MoveOutcome::Accepted(_))));
    assert_eq!(after_move.board.get(4), Some(Mark::O));
    assert!(reset.is_ok());
    assert!(alice.document().unwrap().board.cells().iter().all(Option::is_none));
}
