//! Errors raised by the realtime engine.

use thiserror::Error;

use storefront_core::error::{AppError, ErrorKind};
use storefront_core::types::ConnectionId;

/// Failure modes surfaced by registry and dispatch operations.
///
/// Unknown rooms and unknown connections are deliberately absent: those are
/// silent no-ops because their existence races with concurrent joins, leaves
/// and closes.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// A connection was registered twice under the same identifier.
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),
    /// The credential verifier rejected the presented token.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    /// An inbound frame could not be parsed or failed validation.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        let kind = match &err {
            RealtimeError::DuplicateConnection(_) => ErrorKind::Conflict,
            RealtimeError::AuthenticationFailed(_) => ErrorKind::Authentication,
            RealtimeError::MalformedFrame(_) => ErrorKind::Validation,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
