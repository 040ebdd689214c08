//! Realtime administration: engine stats and server-side room broadcast.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use storefront_realtime::EngineStats;

use crate::error::ApiError;
use crate::extractors::AuthSubject;
use crate::state::AppState;

/// Body of a successful room broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// Target room.
    pub room: String,
    /// Members the document was queued to.
    pub delivered: usize,
}

/// POST /api/rooms/{room}/broadcast
pub async fn broadcast_to_room(
    State(state): State<AppState>,
    AuthSubject(subject): AuthSubject,
    Path(room): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let delivered = state.realtime.broadcast_to_room(&room, &payload).await?;

    info!(room = %room, delivered, user_id = %subject, "Server-side room broadcast");
    Ok(Json(BroadcastResponse { room, delivered }))
}

/// GET /api/realtime/stats
pub async fn stats(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.realtime.stats().await)
}
