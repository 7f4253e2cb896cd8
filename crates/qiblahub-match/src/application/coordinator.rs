//! Client-side match coordinator.
//!
//! Owns at most one live subscription to a match document and caches the
//! latest snapshot it delivered. Commands are validated against that cached
//! snapshot, which may be stale; the cache itself only changes when the store
//! pushes a new snapshot, never speculatively. Dropping the coordinator, or
//! leaving or switching matches, drops the subscription.

use qiblahub_core::error::DomainError;
use qiblahub_core::identity::ParticipantId;
use qiblahub_core::session::SessionContext;
use qiblahub_core::store::{DocumentId, DocumentSnapshot, DocumentSubscription, from_fields};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::command_handlers::{
    LeaveOutcome, MATCHES_COLLECTION, MoveOutcome, commit_join, commit_leave, commit_move,
    commit_reset, handle_create_match,
};
use crate::domain::board::Mark;
use crate::domain::commands::CreateMatch;
use crate::domain::document::{MatchDocument, MoveRejection, ParticipantState};

#[derive(Debug)]
struct ActiveMatch {
    id: DocumentId,
    subscription: DocumentSubscription,
    cached: Option<MatchDocument>,
}

fn decode(snapshot: DocumentSnapshot) -> Result<Option<MatchDocument>, DomainError> {
    snapshot.map(from_fields::<MatchDocument>).transpose()
}

/// Drives one participant through the match lifecycle.
#[derive(Debug)]
pub struct MatchCoordinator {
    session: SessionContext,
    active: Option<ActiveMatch>,
}

impl MatchCoordinator {
    /// Creates a coordinator with no active match.
    #[must_use]
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            active: None,
        }
    }

    /// The participant this coordinator acts for.
    #[must_use]
    pub fn participant(&self) -> &ParticipantId {
        self.session.participant()
    }

    /// Identifier of the subscribed match, if any.
    #[must_use]
    pub fn match_id(&self) -> Option<&DocumentId> {
        self.active.as_ref().map(|active| &active.id)
    }

    /// Latest snapshot delivered for the subscribed match.
    #[must_use]
    pub fn document(&self) -> Option<&MatchDocument> {
        self.active.as_ref().and_then(|active| active.cached.as_ref())
    }

    /// Where the participant stands, derived from the cached snapshot.
    #[must_use]
    pub fn state(&self) -> ParticipantState {
        ParticipantState::derive(self.document(), self.participant())
    }

    /// The participant's role in the cached snapshot.
    #[must_use]
    pub fn my_role(&self) -> Option<Mark> {
        self.document()
            .and_then(|document| document.role_of(self.participant()))
    }

    /// Opens a new match owned by this participant and subscribes to it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the write or subscription
    /// fails; the current match (if any) stays active in that case.
    #[instrument(skip(self), fields(participant = %self.session.participant()))]
    pub async fn create_match(&mut self) -> Result<DocumentId, DomainError> {
        let command = CreateMatch {
            correlation_id: Uuid::new_v4(),
            owner: self.participant().clone(),
        };
        let created =
            handle_create_match(&command, self.session.clock(), self.session.store()).await?;
        let subscription = self.subscribe(&created.match_id).await?;
        self.activate(created.match_id.clone(), subscription)?;
        Ok(created.match_id)
    }

    /// Takes seat 2 of `match_id` and subscribes to it. A competing joiner
    /// is not arbitrated: the last join to reach the store holds the seat.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CannotJoinOwnMatch` before any write if this
    /// participant owns the match, `DomainError::MatchNotFound`, or a store
    /// error. On error the current match (if any) stays active.
    #[instrument(skip(self), fields(participant = %self.session.participant()))]
    pub async fn join_match(&mut self, match_id: &DocumentId) -> Result<(), DomainError> {
        let mut subscription = self.subscribe(match_id).await?;
        let document = decode(subscription.latest())?
            .ok_or_else(|| DomainError::MatchNotFound(match_id.clone()))?;
        commit_join(
            self.session.store(),
            match_id,
            document,
            self.participant().clone(),
        )
        .await?;
        info!(%match_id, "joined match");
        self.activate(match_id.clone(), subscription)
    }

    /// Submits a move on the subscribed match.
    ///
    /// Returns `MoveOutcome::Rejected(NotAParticipant)` when there is no
    /// active match.
    ///
    /// Once the write is accepted the outcome is returned even if the
    /// follow-up read of the match feed fails; the cache then catches up on a
    /// later [`MatchCoordinator::sync`] or [`MatchCoordinator::next_update`].
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails; the cached snapshot is
    /// unchanged in that case.
    #[instrument(skip(self), fields(participant = %self.session.participant()))]
    pub async fn submit_move(&mut self, cell: usize) -> Result<MoveOutcome, DomainError> {
        let Some((match_id, document)) = self.cached() else {
            return Ok(MoveOutcome::Rejected(MoveRejection::NotAParticipant));
        };
        let outcome = commit_move(
            self.session.store(),
            self.session.clock(),
            &match_id,
            document,
            self.session.participant(),
            cell,
        )
        .await?;
        self.sync_after_write();
        Ok(outcome)
    }

    /// Leaves the subscribed match and drops the subscription.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails; the subscription is kept in
    /// that case.
    #[instrument(skip(self), fields(participant = %self.session.participant()))]
    pub async fn leave_match(&mut self) -> Result<(), DomainError> {
        let Some(active) = &self.active else {
            return Ok(());
        };
        if let Some(document) = active.cached.clone() {
            let outcome = commit_leave(
                self.session.store(),
                &active.id,
                document,
                self.session.participant(),
            )
            .await?;
            info!(
                match_id = %active.id,
                deleted = matches!(outcome, LeaveOutcome::Deleted),
                "left match"
            );
        }
        self.active = None;
        Ok(())
    }

    /// Starts a new game on the subscribed match. As with
    /// [`MatchCoordinator::submit_move`], a stored reset is reported as done
    /// even if the follow-up feed read fails.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAParticipant` if there is no active match or
    /// this participant holds no seat, or a store error.
    #[instrument(skip(self), fields(participant = %self.session.participant()))]
    pub async fn reset_match(&mut self) -> Result<(), DomainError> {
        let Some((match_id, document)) = self.cached() else {
            return Err(DomainError::NotAParticipant(self.participant().clone()));
        };
        commit_reset(
            self.session.store(),
            self.session.clock(),
            &match_id,
            document,
            self.session.participant(),
        )
        .await?;
        self.sync_after_write();
        Ok(())
    }

    /// Applies a pending snapshot, if one arrived. Returns `true` if the
    /// cache changed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedDocument` if the snapshot does not
    /// decode (the previous cache is kept), or `StoreUnavailable` if the
    /// store closed the feed.
    pub fn sync(&mut self) -> Result<bool, DomainError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(false);
        };
        if !active.subscription.has_changed()? {
            return Ok(false);
        }
        let snapshot = active.subscription.latest();
        Self::apply(active, snapshot)?;
        Ok(true)
    }

    /// Waits for the next snapshot of the subscribed match and caches it.
    /// Returns `Ok(None)` immediately when there is no active match, and
    /// `Ok(None)` once the document has been deleted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedDocument` or `StoreUnavailable` as for
    /// [`MatchCoordinator::sync`].
    pub async fn next_update(&mut self) -> Result<Option<&MatchDocument>, DomainError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(None);
        };
        let snapshot = active.subscription.next().await?;
        Self::apply(active, snapshot)?;
        Ok(active.cached.as_ref())
    }

    fn sync_after_write(&mut self) {
        if let Err(e) = self.sync() {
            warn!(error = %e, "write stored but the match feed could not be read");
        }
    }

    async fn subscribe(&self, match_id: &DocumentId) -> Result<DocumentSubscription, DomainError> {
        self.session
            .store()
            .subscribe_to_document(MATCHES_COLLECTION, match_id)
            .await
    }

    fn activate(
        &mut self,
        id: DocumentId,
        mut subscription: DocumentSubscription,
    ) -> Result<(), DomainError> {
        let cached = decode(subscription.latest())?;
        if let Some(previous) = self.active.take() {
            debug!(match_id = %previous.id, "unsubscribing from previous match");
        }
        self.active = Some(ActiveMatch {
            id,
            subscription,
            cached,
        });
        Ok(())
    }

    fn apply(active: &mut ActiveMatch, snapshot: DocumentSnapshot) -> Result<(), DomainError> {
        match decode(snapshot) {
            Ok(cached) => {
                active.cached = cached;
                Ok(())
            }
            Err(e) => {
                warn!(match_id = %active.id, error = %e, "ignoring undecodable match snapshot");
                Err(e)
            }
        }
    }

    fn cached(&self) -> Option<(DocumentId, MatchDocument)> {
        let active = self.active.as_ref()?;
        let document = active.cached.clone()?;
        Some((active.id.clone(), document))
    }
}
