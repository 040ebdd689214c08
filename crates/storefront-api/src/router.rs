//! Route definitions for the Storefront HTTP API.
//!
//! Service and health routes sit at the root, the WebSocket upgrade at `/ws`,
//! and realtime administration under `/api`.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes, threading `AppState` through.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .route("/ws", get(handlers::ws::ws_upgrade))
        .nest("/api", realtime_routes())
        .with_state(state)
}

/// Root and health endpoints
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
}

/// Realtime stats and server-side broadcast
fn realtime_routes() -> Router<AppState> {
    Router::new()
        .route("/realtime/stats", get(handlers::rooms::stats))
        .route(
            "/rooms/{room}/broadcast",
            post(handlers::rooms::broadcast_to_room),
        )
}
