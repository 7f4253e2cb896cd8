//! Commands for the chat room.

use qiblahub_core::command::Command;
use qiblahub_core::identity::ParticipantId;
use uuid::Uuid;

/// Command to post a message.
#[derive(Debug, Clone)]
pub struct SendMessage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The author.
    pub sender: ParticipantId,
    /// Raw text as typed; trimmed and validated by the handler.
    pub text: String,
}

impl Command for SendMessage {
    fn command_type(&self) -> &'static str {
        "chat.send_message"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ParticipantId {
        &self.sender
    }
}
