//! Ping/pong heartbeat for WebSocket keepalive.
//!
//! A single task sweeps every registered connection once per interval:
//! peers that answered recently get a fresh ping, peers silent for longer
//! than [`RealtimeConfig::heartbeat_deadline`] are timed out.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use storefront_core::config::RealtimeConfig;

use crate::metrics::EngineMetrics;
use crate::registry::ConnectionRegistry;

/// Outcome of one heartbeat sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Connections a ping was queued to.
    pub probed: usize,
    /// Connections past the heartbeat deadline.
    pub timed_out: usize,
    /// Timed-out connections removed from the registry.
    pub reaped: usize,
}

/// Runs one pass over every registered connection.
pub async fn sweep(
    registry: &ConnectionRegistry,
    config: &RealtimeConfig,
    metrics: &EngineMetrics,
) -> SweepReport {
    let deadline = config.heartbeat_deadline();
    let now = Instant::now();
    let peers = registry.liveness().await;

    if peers.len() > config.connection_warn_threshold {
        warn!(
            connections = peers.len(),
            threshold = config.connection_warn_threshold,
            "High number of WebSocket connections"
        );
    }

    let mut report = SweepReport::default();
    for (handle, last_pong) in peers {
        let silent = now.saturating_duration_since(last_pong);
        if silent > deadline {
            report.timed_out += 1;
            metrics.heartbeat_timeout();
            warn!(
                conn_id = %handle.id(),
                silent_ms = silent.as_millis() as u64,
                "WebSocket heartbeat timeout"
            );

            if config.reap_on_heartbeat_timeout {
                handle.begin_closing();
                handle.request_close();
                if registry.remove(&handle.id()).await {
                    report.reaped += 1;
                }
                continue;
            }
        }

        if handle.send_ping() {
            report.probed += 1;
        }
    }

    report
}

/// Sweeps on a fixed interval until the shutdown signal fires.
pub async fn run_heartbeat(
    registry: Arc<ConnectionRegistry>,
    config: RealtimeConfig,
    metrics: Arc<EngineMetrics>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let period = config.heartbeat_interval();
    if period.is_zero() {
        warn!("Heartbeat interval is zero, heartbeat disabled");
        return;
    }

    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = sweep(&registry, &config, &metrics).await;
                debug!(
                    probed = report.probed,
                    timed_out = report.timed_out,
                    reaped = report.reaped,
                    "Heartbeat sweep complete"
                );
            }
            _ = shutdown.recv() => break,
        }
    }

    debug!("Heartbeat loop stopped");
}
