//! Command abstractions.

use uuid::Uuid;

use crate::identity::ParticipantId;

/// A user intent addressed to the shared store on behalf of one participant.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name used in log lines, e.g. `"match.submit_move"`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID linking the command to the log lines it produces.
    fn correlation_id(&self) -> Uuid;

    /// The participant issuing the command.
    fn actor(&self) -> &ParticipantId;
}
