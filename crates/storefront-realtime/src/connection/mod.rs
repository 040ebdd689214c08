//! WebSocket connection management: transport handles, lifecycle, heartbeat, dispatch.

pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod state;

pub use handle::{ConnectionHandle, OutboundFrame};
pub use manager::ConnectionManager;
pub use state::ConnectionState;
