//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use storefront_core::config::RealtimeConfig;
use storefront_core::error::AppError;
use storefront_core::traits::CredentialVerifier;

use crate::connection::heartbeat::run_heartbeat;
use crate::connection::manager::ConnectionManager;
use crate::message::validator::validate_room_name;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::registry::{ConnectionRegistry, RoomSummary};

/// Point-in-time view of the engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    /// Registered connections.
    pub connections: usize,
    /// Rooms with at least one member.
    pub rooms: usize,
    /// Per-room member counts, sorted by room name.
    pub room_members: Vec<RoomSummary>,
    /// Counters since startup.
    pub metrics: MetricsSnapshot,
}

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
    /// Engine configuration.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(EngineMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new(verifier, metrics.clone()));
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            registry.clone(),
            metrics.clone(),
        ));

        info!("Real-time engine initialized");

        Self {
            connections,
            registry,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Starts the heartbeat sweep; it stops when [`shutdown`](Self::shutdown) runs.
    pub fn spawn_heartbeat(&self) -> JoinHandle<()> {
        tokio::spawn(run_heartbeat(
            self.registry.clone(),
            self.config.clone(),
            self.metrics.clone(),
            self.shutdown_tx.subscribe(),
        ))
    }

    /// Publishes a server-originated JSON document, unchanged, to a room.
    ///
    /// Returns the number of members the frame was queued to.
    pub async fn broadcast_to_room(&self, room: &str, payload: &Value) -> Result<usize, AppError> {
        validate_room_name(room, self.config.max_room_name_length)?;
        Ok(self.registry.broadcast(room, payload).await)
    }

    /// Returns connection, room and counter figures.
    pub async fn stats(&self) -> EngineStats {
        let room_members = self.registry.room_summaries().await;
        EngineStats {
            connections: self.registry.connection_count().await,
            rooms: room_members.len(),
            room_members,
            metrics: self.metrics.snapshot(),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        // Signal all tasks to stop
        let _ = self.shutdown_tx.send(());

        let handles = self.registry.drain().await;
        for handle in &handles {
            handle.begin_closing();
            handle.request_close();
        }

        info!(count = handles.len(), "Real-time engine shut down");
        Ok(())
    }
}
