//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::types::{ConnectionId, SubjectId};

use super::serializer::iso8601;

/// Messages sent by the client to the server.
///
/// Every field is optional on the wire; handlers decide what a missing field
/// means. Tags the server does not know parse as [`InboundMessage::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Join a room.
    Subscribe {
        /// Room name.
        room: Option<String>,
    },
    /// Leave a room.
    Unsubscribe {
        /// Room name.
        room: Option<String>,
    },
    /// Fan a payload out to every member of a room.
    Broadcast {
        /// Room name.
        room: Option<String>,
        /// Arbitrary JSON payload.
        payload: Option<serde_json::Value>,
    },
    /// Attach an authenticated subject to this connection.
    Authenticate {
        /// Opaque bearer token.
        token: Option<String>,
    },
    /// Any other tag.
    #[serde(other)]
    Unknown,
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Sent once, right after the connection is accepted.
    Connected {
        /// Identifier assigned to this connection.
        #[serde(rename = "clientId")]
        client_id: ConnectionId,
        /// Timestamp.
        #[serde(with = "iso8601")]
        timestamp: DateTime<Utc>,
    },
    /// Subscription confirmed.
    Subscribed {
        /// Room name.
        room: String,
        /// Timestamp.
        #[serde(with = "iso8601")]
        timestamp: DateTime<Utc>,
    },
    /// A client broadcast delivered to a room member.
    Message {
        /// Room the payload was sent to.
        room: String,
        /// Payload as sent by the originating client.
        payload: serde_json::Value,
        /// Connection that sent the broadcast.
        sender: ConnectionId,
        /// Timestamp.
        #[serde(with = "iso8601")]
        timestamp: DateTime<Utc>,
    },
    /// Authentication succeeded.
    Authenticated {
        /// Subject resolved from the token.
        #[serde(rename = "userId")]
        user_id: SubjectId,
        /// Timestamp.
        #[serde(with = "iso8601")]
        timestamp: DateTime<Utc>,
    },
    /// Authentication failed.
    AuthError {
        /// Client-facing reason.
        message: String,
    },
}
