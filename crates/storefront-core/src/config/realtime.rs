//! Real-time WebSocket engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's outbound frame queue.
    #[serde(default = "default_send_buffer")]
    pub send_buffer_size: usize,
    /// Interval between heartbeat sweeps in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Grace period after a missed sweep before a peer counts as dead, in seconds.
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_seconds: u64,
    /// Remove connections that miss the heartbeat window (otherwise only logged).
    #[serde(default = "default_true")]
    pub reap_on_heartbeat_timeout: bool,
    /// Largest accepted inbound frame in bytes.
    #[serde(default = "default_max_frame")]
    pub max_frame_bytes: usize,
    /// Longest accepted room name in characters.
    #[serde(default = "default_max_room_name")]
    pub max_room_name_length: usize,
    /// Live connection count above which each sweep logs a warning.
    #[serde(default = "default_warn_threshold")]
    pub connection_warn_threshold: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            send_buffer_size: default_send_buffer(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            heartbeat_timeout_seconds: default_heartbeat_timeout(),
            reap_on_heartbeat_timeout: true,
            max_frame_bytes: default_max_frame(),
            max_room_name_length: default_max_room_name(),
            connection_warn_threshold: default_warn_threshold(),
        }
    }
}

impl RealtimeConfig {
    /// Sweep interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }

    /// Maximum silence tolerated since the last pong: one full sweep
    /// interval plus the configured grace period.
    pub fn heartbeat_deadline(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds + self.heartbeat_timeout_seconds)
    }
}

fn default_send_buffer() -> usize {
    256
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_heartbeat_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_max_frame() -> usize {
    65_536
}

fn default_max_room_name() -> usize {
    256
}

fn default_warn_threshold() -> usize {
    500
}
