//! Connection lifecycle states.

use serde::Serialize;

/// Lifecycle of a single connection.
///
/// `Connecting → Open → Closing → Closed`. Only `Open` connections accept
/// room operations and outbound frames; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ConnectionState {
    /// Accepted by the transport, not yet registered.
    Connecting = 0,
    /// Registered and exchanging frames.
    Open = 1,
    /// Shutdown started; inbound frames are dropped.
    Closing = 2,
    /// Removed from the registry.
    Closed = 3,
}

impl ConnectionState {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}
