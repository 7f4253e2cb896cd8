//! Routes for the chat room.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use qiblahub_chat::PostedMessage;
use qiblahub_chat::application::command_handlers;
use qiblahub_chat::domain::commands;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::Participant;
use crate::state::AppState;

/// Query string for GET /api/v1/chat/messages.
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    /// How many of the newest messages to return (default 50).
    pub limit: Option<usize>,
}

/// Request body for POST /api/v1/chat/messages.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message text; trimmed, 1 to 500 characters.
    pub text: String,
}

/// GET /api/v1/chat/messages
async fn recent_messages(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<PostedMessage>> {
    Json(state.chat.recent(query.limit))
}

/// POST /api/v1/chat/messages
#[instrument(skip_all, fields(participant = %participant.0))]
async fn send_message(
    State(state): State<AppState>,
    participant: Participant,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<PostedMessage>), ApiError> {
    let command = commands::SendMessage {
        correlation_id: Uuid::new_v4(),
        sender: participant.0,
        text: request.text,
    };

    info!(correlation_id = %command.correlation_id, "handling send_message command");

    let posted =
        command_handlers::handle_send_message(&command, state.clock.as_ref(), &*state.store)
            .await?;

    Ok((StatusCode::CREATED, Json(posted)))
}

/// Returns the router for the chat room.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/v1/chat/messages",
        get(recent_messages).post(send_message),
    )
}
