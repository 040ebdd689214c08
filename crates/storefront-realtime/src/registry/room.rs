//! Single room with member tracking.

use std::collections::HashSet;

use storefront_core::types::ConnectionId;

/// A named broadcast group. Holds member identifiers only, never connections.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room name.
    pub name: String,
    /// Set of member connection IDs.
    pub members: HashSet<ConnectionId>,
}

impl Room {
    /// Creates a new empty room.
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: HashSet::new(),
        }
    }

    /// Adds a member. Returns false if it was already present.
    pub fn join(&mut self, conn_id: ConnectionId) -> bool {
        self.members.insert(conn_id)
    }

    /// Removes a member. Returns false if it was not present.
    pub fn leave(&mut self, conn_id: &ConnectionId) -> bool {
        self.members.remove(conn_id)
    }

    /// Returns member count.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the room has any members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns whether `conn_id` is a member.
    pub fn contains(&self, conn_id: &ConnectionId) -> bool {
        self.members.contains(conn_id)
    }
}
