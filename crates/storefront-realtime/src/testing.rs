//! Shared fixtures for unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use storefront_core::error::AppError;
use storefront_core::traits::CredentialVerifier;
use storefront_core::types::{ConnectionId, SubjectId};
use storefront_core::AppResult;

use crate::connection::handle::{ConnectionHandle, OutboundFrame};
use crate::metrics::EngineMetrics;
use crate::registry::ConnectionRegistry;

/// The only token [`StaticVerifier`] accepts.
pub(crate) const VALID_TOKEN: &str = "valid-token";

/// Accepts [`VALID_TOKEN`] as subject `user-1`, rejects everything else.
#[derive(Debug)]
pub(crate) struct StaticVerifier;

#[async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> AppResult<SubjectId> {
        if token == VALID_TOKEN {
            Ok(SubjectId::from("user-1"))
        } else {
            Err(AppError::authentication("Invalid token signature"))
        }
    }
}

pub(crate) fn registry() -> Arc<ConnectionRegistry> {
    registry_with_metrics(Arc::new(EngineMetrics::new()))
}

pub(crate) fn registry_with_metrics(metrics: Arc<EngineMetrics>) -> Arc<ConnectionRegistry> {
    Arc::new(ConnectionRegistry::new(Arc::new(StaticVerifier), metrics))
}

/// A handle already moved to `Open`, plus the receiving end of its queue.
pub(crate) fn open_handle(
    capacity: usize,
) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>) {
    let (tx, rx) = mpsc::channel(capacity);
    let handle = Arc::new(ConnectionHandle::new(ConnectionId::new(), tx));
    handle.mark_open();
    (handle, rx)
}

/// Pops the next queued text frame and parses it as JSON.
pub(crate) fn recv_json(rx: &mut mpsc::Receiver<OutboundFrame>) -> Option<serde_json::Value> {
    loop {
        match rx.try_recv().ok()? {
            OutboundFrame::Text(text) => return serde_json::from_str(&text).ok(),
            OutboundFrame::Ping | OutboundFrame::Close => continue,
        }
    }
}
