//! Command handlers for the match coordinator.
//!
//! Each handler loads a fresh snapshot with `get_document`, runs the pure
//! transition on it, and writes the result back. The `commit_*` functions
//! hold the write half and are shared with `MatchCoordinator`, which
//! validates against its cached snapshot instead of reloading.

use qiblahub_core::clock::Clock;
use qiblahub_core::command::Command;
use qiblahub_core::error::DomainError;
use qiblahub_core::identity::ParticipantId;
use qiblahub_core::store::{DocumentId, DocumentStore, Fields, from_fields, to_fields};
use tracing::{debug, info};

use crate::domain::commands::{CreateMatch, JoinMatch, LeaveMatch, ResetMatch, SubmitMove};
use crate::domain::document::{LeaveEffect, MatchDocument, MoveRejection};

/// Collection holding one document per match.
pub const MATCHES_COLLECTION: &str = "matches";

/// Top-level fields written by a join.
const JOIN_FIELDS: &[&str] = &["players", "status"];

/// Top-level fields written by a leave that keeps the document.
const LEAVE_FIELDS: &[&str] = &["players", "status", "winner"];

/// Result of a successful `CreateMatch`.
#[derive(Debug, Clone)]
pub struct CreatedMatch {
    /// Store-assigned match identifier.
    pub match_id: DocumentId,
    /// The document as written.
    pub document: MatchDocument,
}

/// Result of a move submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was written; carries the document as written.
    Accepted(MatchDocument),
    /// The move was a no-op; nothing was written.
    Rejected(MoveRejection),
}

/// Result of a leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The last player left and the document was deleted.
    Deleted,
    /// The remaining player was kept; carries the document as written.
    Updated(MatchDocument),
}

/// Reads and decodes a match document.
///
/// # Errors
///
/// Returns `DomainError::MatchNotFound` if the document is absent,
/// `DomainError::MalformedDocument` if it does not decode, or any store error.
pub async fn load_match(
    store: &dyn DocumentStore,
    match_id: &DocumentId,
) -> Result<MatchDocument, DomainError> {
    let fields = store
        .get_document(MATCHES_COLLECTION, match_id)
        .await?
        .ok_or_else(|| DomainError::MatchNotFound(match_id.clone()))?;
    from_fields(fields)
}

async fn write_match(
    store: &dyn DocumentStore,
    match_id: &DocumentId,
    document: &MatchDocument,
    only: Option<&[&str]>,
) -> Result<(), DomainError> {
    let mut fields = to_fields(document)?;
    if let Some(keys) = only {
        fields = fields
            .into_iter()
            .filter(|(key, _)| keys.contains(&key.as_str()))
            .collect::<Fields>();
    }
    store
        .update_document(MATCHES_COLLECTION, match_id, fields)
        .await
        .map_err(|e| match e {
            DomainError::DocumentNotFound { id, .. } => DomainError::MatchNotFound(id),
            other => other,
        })
}

pub(crate) async fn commit_join(
    store: &dyn DocumentStore,
    match_id: &DocumentId,
    mut document: MatchDocument,
    joiner: ParticipantId,
) -> Result<MatchDocument, DomainError> {
    document.join(joiner)?;
    write_match(store, match_id, &document, Some(JOIN_FIELDS)).await?;
    Ok(document)
}

pub(crate) async fn commit_move(
    store: &dyn DocumentStore,
    clock: &dyn Clock,
    match_id: &DocumentId,
    mut document: MatchDocument,
    actor: &ParticipantId,
    cell: usize,
) -> Result<MoveOutcome, DomainError> {
    if let Err(rejection) = document.apply_move(actor, cell, clock) {
        debug!(%match_id, %actor, cell, %rejection, "move rejected");
        return Ok(MoveOutcome::Rejected(rejection));
    }
    write_match(store, match_id, &document, None).await?;
    Ok(MoveOutcome::Accepted(document))
}

pub(crate) async fn commit_leave(
    store: &dyn DocumentStore,
    match_id: &DocumentId,
    mut document: MatchDocument,
    leaver: &ParticipantId,
) -> Result<LeaveOutcome, DomainError> {
    match document.leave(leaver)? {
        LeaveEffect::Delete => {
            store.delete_document(MATCHES_COLLECTION, match_id).await?;
            Ok(LeaveOutcome::Deleted)
        }
        LeaveEffect::Update => {
            write_match(store, match_id, &document, Some(LEAVE_FIELDS)).await?;
            Ok(LeaveOutcome::Updated(document))
        }
    }
}

pub(crate) async fn commit_reset(
    store: &dyn DocumentStore,
    clock: &dyn Clock,
    match_id: &DocumentId,
    mut document: MatchDocument,
    actor: &ParticipantId,
) -> Result<MatchDocument, DomainError> {
    document.reset(actor, clock)?;
    write_match(store, match_id, &document, None).await?;
    Ok(document)
}

/// Handles the `CreateMatch` command: inserts a waiting match owned by the
/// command's owner.
///
/// # Errors
///
/// Returns `DomainError` if the document cannot be encoded or written.
pub async fn handle_create_match(
    command: &CreateMatch,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<CreatedMatch, DomainError> {
    let document = MatchDocument::new(command.owner.clone(), clock);
    let match_id = store
        .create_document(MATCHES_COLLECTION, to_fields(&document)?)
        .await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        %match_id,
        "match created"
    );
    Ok(CreatedMatch { match_id, document })
}

/// Handles the `JoinMatch` command.
///
/// # Errors
///
/// Returns `DomainError::CannotJoinOwnMatch` (before any write),
/// `DomainError::MatchNotFound`, or a store error.
pub async fn handle_join_match(
    command: &JoinMatch,
    store: &dyn DocumentStore,
) -> Result<MatchDocument, DomainError> {
    let document = load_match(store, &command.match_id).await?;
    let document = commit_join(store, &command.match_id, document, command.joiner.clone()).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        match_id = %command.match_id,
        "match joined"
    );
    Ok(document)
}

/// Handles the `SubmitMove` command. An invalid move is not an error: it
/// comes back as `MoveOutcome::Rejected` and nothing is written.
///
/// # Errors
///
/// Returns `DomainError::MatchNotFound` or a store error.
pub async fn handle_submit_move(
    command: &SubmitMove,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<MoveOutcome, DomainError> {
    let document = load_match(store, &command.match_id).await?;
    let outcome = commit_move(
        store,
        clock,
        &command.match_id,
        document,
        &command.actor,
        command.cell,
    )
    .await?;
    if let MoveOutcome::Accepted(document) = &outcome {
        info!(
            command_type = command.command_type(),
            correlation_id = %command.correlation_id,
            match_id = %command.match_id,
            cell = command.cell,
            winner = ?document.winner,
            "move accepted"
        );
    }
    Ok(outcome)
}

/// Handles the `LeaveMatch` command.
///
/// # Errors
///
/// Returns `DomainError::NotAParticipant`, `DomainError::MatchNotFound`, or a
/// store error.
pub async fn handle_leave_match(
    command: &LeaveMatch,
    store: &dyn DocumentStore,
) -> Result<LeaveOutcome, DomainError> {
    let document = load_match(store, &command.match_id).await?;
    let outcome = commit_leave(store, &command.match_id, document, &command.leaver).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        match_id = %command.match_id,
        deleted = matches!(outcome, LeaveOutcome::Deleted),
        "match left"
    );
    Ok(outcome)
}

/// Handles the `ResetMatch` command.
///
/// # Errors
///
/// Returns `DomainError::NotAParticipant`, `DomainError::MatchNotFound`, or a
/// store error.
pub async fn handle_reset_match(
    command: &ResetMatch,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<MatchDocument, DomainError> {
    let document = load_match(store, &command.match_id).await?;
    let document = commit_reset(store, clock, &command.match_id, document, &command.actor).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        match_id = %command.match_id,
        "match reset"
    );
    Ok(document)
}
