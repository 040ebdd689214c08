//! Builder helpers for constructing outbound messages stamped with the current time.

use chrono::Utc;

use storefront_core::types::{ConnectionId, SubjectId};

use super::types::OutboundMessage;

/// Client-facing text of every authentication failure.
pub const INVALID_TOKEN: &str = "Invalid token";

/// Build the welcome frame sent after accept
pub fn build_connected(client_id: ConnectionId) -> OutboundMessage {
    OutboundMessage::Connected {
        client_id,
        timestamp: Utc::now(),
    }
}

/// Build a subscription acknowledgement
pub fn build_subscribed(room: &str) -> OutboundMessage {
    OutboundMessage::Subscribed {
        room: room.to_string(),
        timestamp: Utc::now(),
    }
}

/// Build the fan-out frame for a client broadcast
pub fn build_room_message(
    room: &str,
    payload: serde_json::Value,
    sender: ConnectionId,
) -> OutboundMessage {
    OutboundMessage::Message {
        room: room.to_string(),
        payload,
        sender,
        timestamp: Utc::now(),
    }
}

/// Build an authentication success reply
pub fn build_authenticated(user_id: SubjectId) -> OutboundMessage {
    OutboundMessage::Authenticated {
        user_id,
        timestamp: Utc::now(),
    }
}

/// Build an authentication failure reply
pub fn build_auth_error() -> OutboundMessage {
    OutboundMessage::AuthError {
        message: INVALID_TOKEN.to_string(),
    }
}
