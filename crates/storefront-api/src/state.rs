//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use storefront_core::config::AppConfig;
use storefront_core::traits::CredentialVerifier;
use storefront_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Bearer token verifier for HTTP routes
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Assembles state, stamping the start time now.
    pub fn new(
        config: Arc<AppConfig>,
        realtime: Arc<RealtimeEngine>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            config,
            realtime,
            verifier,
            started_at: Instant::now(),
        }
    }
}
