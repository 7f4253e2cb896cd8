//! Qibla Hub — HTTP API.
//!
//! Exposes the compass, online matches, chat and the arcade catalog over
//! JSON. Callers identify themselves with the `x-participant-id` header.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router over `state`.
pub fn build_router(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    Router::new()
        .merge(routes::health::router())
        .merge(routes::identity::router())
        .merge(routes::compass::router())
        .merge(routes::matches::router())
        .merge(routes::chat::router())
        .merge(routes::games::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
