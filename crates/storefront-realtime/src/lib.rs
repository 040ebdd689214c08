//! # storefront-realtime
//!
//! Real-time WebSocket engine for the Storefront backend. Provides:
//!
//! - A connection registry with named rooms (subscribe/unsubscribe/broadcast)
//! - Per-connection transport handles with an explicit lifecycle state machine
//! - Inbound frame dispatch, including optional bearer-token authentication
//! - A heartbeat sweep that pings live peers and reaps silent ones
//!
//! The transport itself (accepting sockets, reading and writing frames) is
//! left to the caller, which drives [`ConnectionManager`].

pub mod connection;
pub mod error;
pub mod message;
pub mod metrics;
pub mod registry;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::manager::ConnectionManager;
pub use connection::{ConnectionHandle, ConnectionState, OutboundFrame};
pub use error::RealtimeError;
pub use registry::ConnectionRegistry;
pub use server::{EngineStats, RealtimeEngine};
