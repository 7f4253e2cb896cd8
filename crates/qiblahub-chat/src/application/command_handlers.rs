//! Command handlers for the chat room.

use qiblahub_core::clock::Clock;
use qiblahub_core::command::Command;
use qiblahub_core::error::DomainError;
use qiblahub_core::store::{DocumentStore, to_fields};
use tracing::info;

use crate::domain::commands::SendMessage;
use crate::domain::message::{ChatMessage, PostedMessage};

/// Collection holding one document per message.
pub const CHAT_COLLECTION: &str = "chatMessages";

/// Handles the `SendMessage` command: validates the text, stamps it with the
/// clock, and stores it.
///
/// # Errors
///
/// Returns `DomainError::Validation` for empty or overlong text (nothing is
/// written), or a store error.
pub async fn handle_send_message(
    command: &SendMessage,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<PostedMessage, DomainError> {
    let message = ChatMessage::compose(command.sender.clone(), &command.text, clock.now())?;
    let id = store
        .create_document(CHAT_COLLECTION, to_fields(&message)?)
        .await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        message_id = %id,
        "chat message sent"
    );
    Ok(PostedMessage { id, message })
}
