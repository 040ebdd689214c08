//! Health check handlers.

use axum::Json;
use axum::extract::State;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name.
    pub service: String,
    /// Always `running`.
    pub status: String,
    /// Response time (ISO-8601).
    pub timestamp: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    /// Response time (ISO-8601).
    pub timestamp: String,
    /// Seconds since startup.
    pub uptime: f64,
    /// Live WebSocket connections.
    pub ws_connections: usize,
    /// Rooms with at least one member.
    pub rooms: usize,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: env!("CARGO_PKG_NAME").to_string(),
        status: "running".to_string(),
        timestamp: now_iso(),
    })
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = &state.realtime.registry;

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: now_iso(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        ws_connections: registry.connection_count().await,
        rooms: registry.room_count().await,
    })
}
