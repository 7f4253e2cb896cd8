//! Commands for the match coordinator.

use qiblahub_core::command::Command;
use qiblahub_core::identity::ParticipantId;
use qiblahub_core::store::DocumentId;
use uuid::Uuid;

/// Command to open a new match in the lobby.
#[derive(Debug, Clone)]
pub struct CreateMatch {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The participant who takes seat 1.
    pub owner: ParticipantId,
}

impl Command for CreateMatch {
    fn command_type(&self) -> &'static str {
        "match.create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ParticipantId {
        &self.owner
    }
}

/// Command to take seat 2 of a waiting match.
#[derive(Debug, Clone)]
pub struct JoinMatch {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The match to join.
    pub match_id: DocumentId,
    /// The joining participant.
    pub joiner: ParticipantId,
}

impl Command for JoinMatch {
    fn command_type(&self) -> &'static str {
        "match.join"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ParticipantId {
        &self.joiner
    }
}

/// Command to mark a cell.
#[derive(Debug, Clone)]
pub struct SubmitMove {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The match being played.
    pub match_id: DocumentId,
    /// The participant making the move.
    pub actor: ParticipantId,
    /// Row-major cell index, 0 to 8.
    pub cell: usize,
}

impl Command for SubmitMove {
    fn command_type(&self) -> &'static str {
        "match.submit_move"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ParticipantId {
        &self.actor
    }
}

/// Command to give up a seat.
#[derive(Debug, Clone)]
pub struct LeaveMatch {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The match to leave.
    pub match_id: DocumentId,
    /// The leaving participant.
    pub leaver: ParticipantId,
}

impl Command for LeaveMatch {
    fn command_type(&self) -> &'static str {
        "match.leave"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ParticipantId {
        &self.leaver
    }
}

/// Command to start a new game on the same seats.
#[derive(Debug, Clone)]
pub struct ResetMatch {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The match to reset.
    pub match_id: DocumentId,
    /// The participant asking for the reset.
    pub actor: ParticipantId,
}

impl Command for ResetMatch {
    fn command_type(&self) -> &'static str {
        "match.reset"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ParticipantId {
        &self.actor
    }
}
