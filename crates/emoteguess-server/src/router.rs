//! Axum router construction for the game server.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete router: game page, event stream, and REST API.
///
/// CORS allows any origin so the page can also be served from elsewhere
/// (an OBS browser source, for example).
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws/events", get(ws::ws_events))
        .route("/api/state", get(handlers::get_state))
        .route(
            "/api/leaderboard",
            get(handlers::get_leaderboard).delete(handlers::clear_leaderboard),
        )
        .route("/api/load", post(handlers::load_channel))
        .route("/api/manual", post(handlers::load_manual))
        .route("/api/guess", post(handlers::guess))
        .route("/api/skip", post(handlers::skip))
        .route("/api/next", post(handlers::next))
        .route("/api/reshuffle", post(handlers::reshuffle))
        .route(
            "/api/announcer",
            put(handlers::set_announcer).delete(handlers::clear_announcer),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
