//! Query handlers for the chat room.

use qiblahub_core::store::{CollectionSnapshot, from_fields};
use tracing::warn;

use crate::domain::message::{ChatMessage, PostedMessage};

/// How many messages a reader sees when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Orders a collection snapshot by `sentAt` (then id) and keeps the last
/// `limit` messages. Documents that do not decode are logged and skipped.
#[must_use]
pub fn latest_messages(snapshot: CollectionSnapshot, limit: usize) -> Vec<PostedMessage> {
    let mut messages: Vec<PostedMessage> = snapshot
        .into_iter()
        .filter_map(|stored| match from_fields::<ChatMessage>(stored.data) {
            Ok(message) => Some(PostedMessage {
                id: stored.id,
                message,
            }),
            Err(e) => {
                warn!(message_id = %stored.id, error = %e, "skipping malformed chat message");
                None
            }
        })
        .collect();
    messages.sort_by(|a, b| {
        a.message
            .sent_at
            .cmp(&b.message.sent_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    let skip = messages.len().saturating_sub(limit);
    messages.split_off(skip)
}
