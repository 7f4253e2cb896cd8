//! Game catalog endpoint.

use axum::{Json, Router, routing::get};
use qiblahub_arcade::{GameEntry, catalog};

use crate::state::AppState;

/// GET /api/v1/games
async fn list_games() -> Json<&'static [GameEntry]> {
    Json(catalog())
}

/// Returns the catalog router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/games", get(list_games))
}
