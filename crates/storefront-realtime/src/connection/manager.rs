//! Connection manager: accept, inbound dispatch, and teardown.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use storefront_core::config::RealtimeConfig;
use storefront_core::types::ConnectionId;

use crate::error::RealtimeError;
use crate::message::builder::{
    build_auth_error, build_authenticated, build_connected, build_room_message, build_subscribed,
};
use crate::message::serializer::{deserialize_inbound, peek_type};
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::message::validator::{validate_inbound, validate_room_name};
use crate::metrics::EngineMetrics;
use crate::registry::ConnectionRegistry;

use super::handle::{ConnectionHandle, OutboundFrame};

/// Drives every connection through its lifecycle on top of the registry.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Shared connection registry.
    registry: Arc<ConnectionRegistry>,
    /// Metrics.
    metrics: Arc<EngineMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<ConnectionRegistry>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            registry,
            metrics,
            config,
        }
    }

    /// Registers a freshly accepted transport and greets it.
    ///
    /// Returns the connection handle and the receiver its writer task drains.
    /// The `connected` frame is always the first frame queued.
    pub async fn accept(
        &self,
    ) -> Result<(Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>), RealtimeError> {
        let (tx, rx) = mpsc::channel(self.config.send_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(ConnectionId::new(), tx));

        self.registry.add(handle.clone()).await?;
        handle.mark_open();
        self.reply(&handle, &build_connected(handle.id())).await;

        info!(conn_id = %handle.id(), "WebSocket client connected");
        Ok((handle, rx))
    }

    /// Processes one inbound text frame from a client.
    ///
    /// Nothing here fails the connection: malformed frames, unknown types and
    /// frames missing their required fields are logged and dropped.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        self.metrics.frame_received();

        let Some(handle) = self.registry.handle(conn_id).await else {
            debug!(conn_id = %conn_id, "Frame from unregistered connection");
            return;
        };
        if !handle.is_open() {
            debug!(conn_id = %conn_id, state = ?handle.state(), "Dropping frame, connection not open");
            return;
        }

        if let Err(e) = validate_inbound(raw, self.config.max_frame_bytes) {
            self.metrics.malformed_frame();
            warn!(conn_id = %conn_id, error = %e, "Rejected WebSocket frame");
            return;
        }

        let msg = match deserialize_inbound(raw) {
            Ok(msg) => msg,
            Err(e) => {
                self.metrics.malformed_frame();
                warn!(conn_id = %conn_id, error = %e, "Invalid WebSocket message");
                return;
            }
        };

        match msg {
            InboundMessage::Subscribe { room } => self.handle_subscribe(&handle, room).await,
            InboundMessage::Unsubscribe { room } => self.handle_unsubscribe(&handle, room).await,
            InboundMessage::Broadcast { room, payload } => {
                self.handle_broadcast(&handle, room, payload).await
            }
            InboundMessage::Authenticate { token } => {
                self.handle_authenticate(&handle, token).await
            }
            InboundMessage::Unknown => {
                debug!(
                    conn_id = %conn_id,
                    message_type = peek_type(raw).as_deref().unwrap_or("?"),
                    "Ignoring unknown message type"
                );
            }
        }
    }

    /// Processes one inbound binary frame. Only UTF-8 JSON is accepted;
    /// anything else counts as a malformed frame.
    pub async fn handle_inbound_bytes(&self, conn_id: &ConnectionId, raw: &[u8]) {
        match std::str::from_utf8(raw) {
            Ok(text) => self.handle_inbound(conn_id, text).await,
            Err(e) => {
                self.metrics.frame_received();
                self.metrics.malformed_frame();
                warn!(conn_id = %conn_id, error = %e, "Binary WebSocket frame is not UTF-8");
            }
        }
    }

    async fn handle_subscribe(&self, handle: &ConnectionHandle, room: Option<String>) {
        let Some(room) = self.checked_room(handle, room) else {
            return;
        };

        if self.registry.join(&handle.id(), &room).await {
            self.reply(handle, &build_subscribed(&room)).await;
            debug!(conn_id = %handle.id(), room = %room, "Client subscribed to room");
        }
    }

    async fn handle_unsubscribe(&self, handle: &ConnectionHandle, room: Option<String>) {
        let Some(room) = self.checked_room(handle, room) else {
            return;
        };

        if self.registry.leave(&handle.id(), &room).await {
            debug!(conn_id = %handle.id(), room = %room, "Client unsubscribed from room");
        }
    }

    async fn handle_broadcast(
        &self,
        handle: &ConnectionHandle,
        room: Option<String>,
        payload: Option<Value>,
    ) {
        let Some(room) = self.checked_room(handle, room) else {
            return;
        };
        let Some(payload) = payload.filter(|p| !p.is_null()) else {
            debug!(conn_id = %handle.id(), room = %room, "Ignoring broadcast without payload");
            return;
        };

        let message = build_room_message(&room, payload, handle.id());
        let delivered = self.registry.broadcast(&room, &message).await;
        debug!(conn_id = %handle.id(), room = %room, delivered, "Client broadcast");
    }

    async fn handle_authenticate(&self, handle: &ConnectionHandle, token: Option<String>) {
        let token = token.unwrap_or_default();

        match self.registry.authenticate(&handle.id(), &token).await {
            Ok(subject) => {
                info!(conn_id = %handle.id(), user_id = %subject, "WebSocket client authenticated");
                self.reply(handle, &build_authenticated(subject)).await;
            }
            Err(e) => {
                info!(conn_id = %handle.id(), error = %e, "WebSocket authentication failed");
                self.reply(handle, &build_auth_error()).await;
            }
        }
    }

    /// Returns the room name if present and acceptable.
    fn checked_room(&self, handle: &ConnectionHandle, room: Option<String>) -> Option<String> {
        let Some(room) = room else {
            debug!(conn_id = %handle.id(), "Ignoring room operation without a room");
            return None;
        };

        match validate_room_name(&room, self.config.max_room_name_length) {
            Ok(()) => Some(room),
            Err(e) => {
                self.metrics.malformed_frame();
                debug!(conn_id = %handle.id(), error = %e, "Ignoring invalid room name");
                None
            }
        }
    }

    /// Queues a direct reply on one connection.
    async fn reply(&self, handle: &ConnectionHandle, message: &OutboundMessage) {
        if !self.registry.send_to(&handle.id(), message).await {
            debug!(conn_id = %handle.id(), "Reply not queued");
        }
    }

    /// Records a transport-level pong.
    pub async fn record_pong(&self, conn_id: &ConnectionId) {
        if !self.registry.record_pong(conn_id).await {
            debug!(conn_id = %conn_id, "Pong from unregistered connection");
        }
    }

    /// Tears a connection down. Safe to call any number of times.
    pub async fn close(&self, handle: &ConnectionHandle) {
        handle.begin_closing();
        self.registry.remove(&handle.id()).await;

        if handle.mark_closed() {
            info!(conn_id = %handle.id(), "WebSocket client disconnected");
        }
    }

    /// Returns the shared registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}
