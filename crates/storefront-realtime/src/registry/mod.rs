//! Connection registry: live connections and the rooms they belong to.

pub mod entry;
pub mod registry;
pub mod room;

pub use entry::{ConnectionEntry, ConnectionMetadata};
pub use registry::{ConnectionRegistry, RoomSummary};
pub use room::Room;
