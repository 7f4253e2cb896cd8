//! Routes for online tic-tac-toe matches.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use qiblahub_core::store::DocumentId;
use qiblahub_match::application::command_handlers::{self, LeaveOutcome, MoveOutcome};
use qiblahub_match::application::query_handlers::{self, MatchSummary};
use qiblahub_match::domain::commands;
use qiblahub_match::{Mark, MatchDocument, MoveRejection};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::Participant;
use crate::state::AppState;

/// Request body for POST /api/v1/matches/{match_id}/moves.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// Row-major cell index, 0 to 8.
    pub cell: usize,
}

/// A match together with its id and the caller's role.
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub match_id: DocumentId,
    pub your_role: Option<Mark>,
    #[serde(rename = "match")]
    pub document: MatchDocument,
}

/// Response body for a move submission.
#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<MoveRejection>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub document: Option<MatchDocument>,
}

/// Response body for a leave.
#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub deleted: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub document: Option<MatchDocument>,
}

fn match_response(
    match_id: DocumentId,
    document: MatchDocument,
    participant: &Participant,
) -> MatchResponse {
    MatchResponse {
        your_role: document.role_of(&participant.0),
        match_id,
        document,
    }
}

/// POST /api/v1/matches
#[instrument(skip_all, fields(participant = %participant.0))]
async fn create_match(
    State(state): State<AppState>,
    participant: Participant,
) -> Result<(StatusCode, Json<MatchResponse>), ApiError> {
    let command = commands::CreateMatch {
        correlation_id: Uuid::new_v4(),
        owner: participant.0.clone(),
    };

    info!(correlation_id = %command.correlation_id, "handling create_match command");

    let created =
        command_handlers::handle_create_match(&command, state.clock.as_ref(), &*state.store)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(match_response(created.match_id, created.document, &participant)),
    ))
}

/// GET /api/v1/matches
async fn list_open_matches(State(state): State<AppState>) -> Json<Vec<MatchSummary>> {
    Json(state.lobby.open_matches())
}

/// GET /api/v1/matches/{match_id}
async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    participant: Participant,
) -> Result<Json<MatchResponse>, ApiError> {
    let match_id = DocumentId::new(match_id);
    let document = query_handlers::get_match_by_id(&match_id, &*state.store).await?;
    Ok(Json(match_response(match_id, document, &participant)))
}

/// POST /api/v1/matches/{match_id}/join
#[instrument(skip_all, fields(participant = %participant.0, match_id = %match_id))]
async fn join_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    participant: Participant,
) -> Result<Json<MatchResponse>, ApiError> {
    let command = commands::JoinMatch {
        correlation_id: Uuid::new_v4(),
        match_id: DocumentId::new(match_id),
        joiner: participant.0.clone(),
    };

    info!(correlation_id = %command.correlation_id, "handling join_match command");

    let document = command_handlers::handle_join_match(&command, &*state.store).await?;

    Ok(Json(match_response(command.match_id, document, &participant)))
}

/// POST /api/v1/matches/{match_id}/moves
#[instrument(skip_all, fields(participant = %participant.0, match_id = %match_id, cell = request.cell))]
async fn submit_move(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    participant: Participant,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let command = commands::SubmitMove {
        correlation_id: Uuid::new_v4(),
        match_id: DocumentId::new(match_id),
        actor: participant.0,
        cell: request.cell,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_move command");

    let outcome =
        command_handlers::handle_submit_move(&command, state.clock.as_ref(), &*state.store)
            .await?;

    let response = match outcome {
        MoveOutcome::Accepted(document) => MoveResponse {
            accepted: true,
            rejection: None,
            document: Some(document),
        },
        MoveOutcome::Rejected(rejection) => MoveResponse {
            accepted: false,
            rejection: Some(rejection),
            document: None,
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/matches/{match_id}/leave
#[instrument(skip_all, fields(participant = %participant.0, match_id = %match_id))]
async fn leave_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    participant: Participant,
) -> Result<Json<LeaveResponse>, ApiError> {
    let command = commands::LeaveMatch {
        correlation_id: Uuid::new_v4(),
        match_id: DocumentId::new(match_id),
        leaver: participant.0,
    };

    info!(correlation_id = %command.correlation_id, "handling leave_match command");

    let outcome = command_handlers::handle_leave_match(&command, &*state.store).await?;

    let response = match outcome {
        LeaveOutcome::Deleted => LeaveResponse {
            deleted: true,
            document: None,
        },
        LeaveOutcome::Updated(document) => LeaveResponse {
            deleted: false,
            document: Some(document),
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/matches/{match_id}/reset
#[instrument(skip_all, fields(participant = %participant.0, match_id = %match_id))]
async fn reset_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    participant: Participant,
) -> Result<Json<MatchResponse>, ApiError> {
    let command = commands::ResetMatch {
        correlation_id: Uuid::new_v4(),
        match_id: DocumentId::new(match_id),
        actor: participant.0.clone(),
    };

    info!(correlation_id = %command.correlation_id, "handling reset_match command");

    let document =
        command_handlers::handle_reset_match(&command, state.clock.as_ref(), &*state.store)
            .await?;

    Ok(Json(match_response(command.match_id, document, &participant)))
}

/// Returns the router for matches.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/matches", post(create_match).get(list_open_matches))
        .route("/api/v1/matches/{match_id}", get(get_match))
        .route("/api/v1/matches/{match_id}/join", post(join_match))
        .route("/api/v1/matches/{match_id}/moves", post(submit_move))
        .route("/api/v1/matches/{match_id}/leave", post(leave_match))
        .route("/api/v1/matches/{match_id}/reset", post(reset_match))
}
