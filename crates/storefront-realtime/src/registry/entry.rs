//! Per-connection registry record.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::time::Instant;

use storefront_core::types::SubjectId;

use crate::connection::handle::ConnectionHandle;

/// Mutable metadata attached to a connection.
#[derive(Debug, Clone)]
pub struct ConnectionMetadata {
    /// Whether a credential has been verified on this connection.
    pub authenticated: bool,
    /// Subject resolved from the credential, once authenticated.
    pub subject_id: Option<SubjectId>,
    /// Last time the peer answered a heartbeat (initialised at accept).
    pub last_pong: Instant,
}

impl ConnectionMetadata {
    fn new() -> Self {
        Self {
            authenticated: false,
            subject_id: None,
            last_pong: Instant::now(),
        }
    }
}

/// The registry's record of one live connection.
#[derive(Debug)]
pub struct ConnectionEntry {
    /// Transport handle, shared with the connection's own tasks.
    pub handle: Arc<ConnectionHandle>,
    /// Names of the rooms this connection belongs to (reverse index).
    pub rooms: HashSet<String>,
    /// Metadata bag.
    pub metadata: ConnectionMetadata,
}

impl ConnectionEntry {
    /// Creates a record with no rooms and fresh metadata.
    pub fn new(handle: Arc<ConnectionHandle>) -> Self {
        Self {
            handle,
            rooms: HashSet::new(),
            metadata: ConnectionMetadata::new(),
        }
    }
}
