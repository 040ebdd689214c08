//! Connection registry owning every live connection and the room index.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error};

use storefront_core::traits::CredentialVerifier;
use storefront_core::types::{ConnectionId, SubjectId};

use crate::connection::handle::ConnectionHandle;
use crate::error::RealtimeError;
use crate::message::serializer::serialize_outbound;
use crate::metrics::EngineMetrics;

use super::entry::{ConnectionEntry, ConnectionMetadata};
use super::room::Room;

/// Member count of a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room name.
    pub name: String,
    /// Number of member connections.
    pub members: usize,
}

/// Both indexes, guarded together so membership changes and empty-room
/// collection happen in one critical section.
#[derive(Debug, Default)]
struct RegistryState {
    /// Connection ID → record (owns the transport handle).
    connections: HashMap<ConnectionId, ConnectionEntry>,
    /// Room name → member IDs. Never contains an empty room.
    rooms: HashMap<String, Room>,
}

/// Drops `conn_id` from `name`, deleting the room once it is empty.
fn detach(rooms: &mut HashMap<String, Room>, conn_id: &ConnectionId, name: &str) -> bool {
    let Some(room) = rooms.get_mut(name) else {
        return false;
    };
    let removed = room.leave(conn_id);
    if room.is_empty() {
        rooms.remove(name);
    }
    removed
}

/// Process-wide registry of live connections and their room memberships.
///
/// Invariants, held whenever the lock is released:
/// - `r ∈ connection.rooms` exactly when `connection ∈ rooms[r]`
/// - every room present has at least one member
///
/// Unknown connections and unknown rooms are never errors: existence races
/// with concurrent joins, leaves and closes, so those calls are no-ops.
#[derive(Debug)]
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
    verifier: Arc<dyn CredentialVerifier>,
    metrics: Arc<EngineMetrics>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new(verifier: Arc<dyn CredentialVerifier>, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            verifier,
            metrics,
        }
    }

    /// Registers a connection under its handle's ID with no rooms and empty metadata.
    pub async fn add(&self, handle: Arc<ConnectionHandle>) -> Result<(), RealtimeError> {
        let conn_id = handle.id();
        {
            let mut state = self.state.lock().await;
            match state.connections.entry(conn_id) {
                Entry::Occupied(_) => return Err(RealtimeError::DuplicateConnection(conn_id)),
                Entry::Vacant(slot) => {
                    slot.insert(ConnectionEntry::new(handle));
                }
            }
        }

        self.metrics.connection_opened();
        Ok(())
    }

    /// Removes a connection from every room, then discards its record.
    ///
    /// Idempotent; returns whether a record was actually discarded.
    pub async fn remove(&self, conn_id: &ConnectionId) -> bool {
        let left = {
            let mut state = self.state.lock().await;
            let RegistryState { connections, rooms } = &mut *state;
            let Some(entry) = connections.remove(conn_id) else {
                return false;
            };
            for name in &entry.rooms {
                detach(rooms, conn_id, name);
            }
            entry.rooms.len()
        };

        self.metrics.connection_closed();
        debug!(conn_id = %conn_id, rooms = left, "Connection removed from registry");
        true
    }

    /// Adds a connection to a room, creating the room on first join.
    ///
    /// Returns false (and does nothing) when the connection is unknown.
    pub async fn join(&self, conn_id: &ConnectionId, room: &str) -> bool {
        let mut state = self.state.lock().await;
        let RegistryState { connections, rooms } = &mut *state;
        let Some(entry) = connections.get_mut(conn_id) else {
            return false;
        };

        rooms
            .entry(room.to_string())
            .or_insert_with(|| Room::new(room.to_string()))
            .join(*conn_id);
        entry.rooms.insert(room.to_string());
        true
    }

    /// Removes a connection from a room, deleting the room once empty.
    ///
    /// Returns whether the membership existed.
    pub async fn leave(&self, conn_id: &ConnectionId, room: &str) -> bool {
        let mut state = self.state.lock().await;
        let RegistryState { connections, rooms } = &mut *state;
        let Some(entry) = connections.get_mut(conn_id) else {
            return false;
        };
        if !entry.rooms.remove(room) {
            return false;
        }
        detach(rooms, conn_id, room);
        true
    }

    /// Serializes `message` once and queues it to every open member of `room`.
    ///
    /// Members that are not open, or whose send queue is full, are skipped but
    /// stay registered. Returns the number of members the frame was queued to;
    /// unknown or empty rooms yield 0.
    pub async fn broadcast<M: Serialize + ?Sized>(&self, room: &str, message: &M) -> usize {
        let text = match serialize_outbound(message) {
            Ok(text) => text,
            Err(e) => {
                error!(room = %room, error = %e, "Failed to serialize broadcast message");
                return 0;
            }
        };

        let delivered = {
            let state = self.state.lock().await;
            let Some(members) = state.rooms.get(room) else {
                return 0;
            };
            members
                .members
                .iter()
                .filter_map(|id| state.connections.get(id))
                .filter(|entry| entry.handle.send_text(text.clone()))
                .count()
        };

        self.metrics.broadcast();
        self.metrics.messages_sent(delivered as u64);
        debug!(room = %room, delivered, "Broadcast delivered");
        delivered
    }

    /// Queues `message` to a single connection. Returns whether it was queued.
    pub async fn send_to<M: Serialize + ?Sized>(&self, conn_id: &ConnectionId, message: &M) -> bool {
        let text = match serialize_outbound(message) {
            Ok(text) => text,
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "Failed to serialize outbound message");
                return false;
            }
        };

        let Some(handle) = self.handle(conn_id).await else {
            return false;
        };
        let sent = handle.send_text(text);
        if sent {
            self.metrics.messages_sent(1);
        }
        sent
    }

    /// Verifies `token` and records the subject on the connection.
    ///
    /// A rejected token leaves the connection registered and its metadata
    /// untouched.
    pub async fn authenticate(
        &self,
        conn_id: &ConnectionId,
        token: &str,
    ) -> Result<SubjectId, RealtimeError> {
        let subject = match self.verifier.verify(token).await {
            Ok(subject) => subject,
            Err(e) => {
                self.metrics.auth_failure();
                return Err(RealtimeError::AuthenticationFailed(e.message));
            }
        };

        let mut state = self.state.lock().await;
        match state.connections.get_mut(conn_id) {
            Some(entry) => {
                entry.metadata.authenticated = true;
                entry.metadata.subject_id = Some(subject.clone());
            }
            None => debug!(conn_id = %conn_id, "Connection closed before authentication completed"),
        }
        Ok(subject)
    }

    /// Records a heartbeat answer. Returns false for unknown connections.
    pub async fn record_pong(&self, conn_id: &ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        match state.connections.get_mut(conn_id) {
            Some(entry) => {
                entry.metadata.last_pong = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Returns the transport handle of a registered connection.
    pub async fn handle(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let state = self.state.lock().await;
        state.connections.get(conn_id).map(|e| e.handle.clone())
    }

    /// Returns a copy of a connection's metadata.
    pub async fn metadata(&self, conn_id: &ConnectionId) -> Option<ConnectionMetadata> {
        let state = self.state.lock().await;
        state.connections.get(conn_id).map(|e| e.metadata.clone())
    }

    /// Whether a connection is registered.
    pub async fn contains(&self, conn_id: &ConnectionId) -> bool {
        self.state.lock().await.connections.contains_key(conn_id)
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    /// Number of rooms with at least one member.
    pub async fn room_count(&self) -> usize {
        self.state.lock().await.rooms.len()
    }

    /// Member IDs of a room (empty for unknown rooms).
    pub async fn room_members(&self, room: &str) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room)
            .map(|r| r.members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Sorted room names a connection belongs to (empty for unknown connections).
    pub async fn rooms_of(&self, conn_id: &ConnectionId) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state
            .connections
            .get(conn_id)
            .map(|e| e.rooms.iter().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Member counts of every room, sorted by name.
    pub async fn room_summaries(&self) -> Vec<RoomSummary> {
        let state = self.state.lock().await;
        let mut summaries: Vec<RoomSummary> = state
            .rooms
            .values()
            .map(|r| RoomSummary {
                name: r.name.clone(),
                members: r.member_count(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// Every connection with the time of its last heartbeat answer.
    pub async fn liveness(&self) -> Vec<(Arc<ConnectionHandle>, Instant)> {
        let state = self.state.lock().await;
        state
            .connections
            .values()
            .map(|e| (e.handle.clone(), e.metadata.last_pong))
            .collect()
    }

    /// Removes every connection and room, returning the handles.
    pub async fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let handles: Vec<Arc<ConnectionHandle>> = {
            let mut state = self.state.lock().await;
            state.rooms.clear();
            state.connections.drain().map(|(_, e)| e.handle).collect()
        };

        for _ in &handles {
            self.metrics.connection_closed();
        }
        handles
    }

    /// Panics if either registry invariant is violated.
    #[cfg(test)]
    pub(crate) async fn assert_consistent(&self) {
        let state = self.state.lock().await;
        for (name, room) in &state.rooms {
            assert!(!room.is_empty(), "room {name} persisted with no members");
            for member in &room.members {
                let entry = state
                    .connections
                    .get(member)
                    .unwrap_or_else(|| panic!("room {name} lists unknown member {member}"));
                assert!(entry.rooms.contains(name), "{member} missing back-reference to {name}");
            }
        }
        for (id, entry) in &state.connections {
            for name in &entry.rooms {
                let room = state
                    .rooms
                    .get(name)
                    .unwrap_or_else(|| panic!("{id} references missing room {name}"));
                assert!(room.contains(id), "room {name} missing member {id}");
            }
        }
    }
}
