//! Message validation rules.

use crate::error::RealtimeError;

/// Validates the raw size and shape of an inbound frame before parsing.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), RealtimeError> {
    if raw.len() > max_bytes {
        return Err(RealtimeError::MalformedFrame(format!(
            "frame of {} bytes exceeds maximum of {max_bytes}",
            raw.len()
        )));
    }

    if raw.trim().is_empty() {
        return Err(RealtimeError::MalformedFrame("empty frame".to_string()));
    }

    Ok(())
}

/// Validates a room name: non-empty, bounded, no control characters.
pub fn validate_room_name(room: &str, max_len: usize) -> Result<(), RealtimeError> {
    if room.is_empty() || room.chars().count() > max_len {
        return Err(RealtimeError::MalformedFrame(
            "invalid room name length".to_string(),
        ));
    }

    if room.chars().any(char::is_control) {
        return Err(RealtimeError::MalformedFrame(
            "room name contains control characters".to_string(),
        ));
    }

    Ok(())
}
