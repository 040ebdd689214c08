//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::{mpsc, watch};

use storefront_core::types::ConnectionId;

use super::state::ConnectionState;

/// A frame queued for the connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Serialized JSON text frame.
    Text(String),
    /// Transport-level liveness probe.
    Ping,
    /// Ask the writer to send a close frame and stop.
    Close,
}

/// A handle to a single WebSocket connection.
///
/// Holds the bounded sender feeding the connection's writer task plus the
/// lifecycle state. Sends never block: a full queue drops the frame. A close
/// request is also published on a watch channel, which a full queue cannot
/// swallow.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    id: ConnectionId,
    /// Sender for outbound frames
    sender: mpsc::Sender<OutboundFrame>,
    /// Current [`ConnectionState`], stored as its discriminant
    state: AtomicU8,
    /// Set once the server wants the transport gone
    close_tx: watch::Sender<bool>,
}

impl ConnectionHandle {
    /// Create a new handle in the `Connecting` state.
    pub fn new(id: ConnectionId, sender: mpsc::Sender<OutboundFrame>) -> Self {
        Self {
            id,
            sender,
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            close_tx: watch::Sender::new(false),
        }
    }

    /// Connection identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Subscribe to close requests. Resolves `wait_for(|c| *c)` once
    /// [`request_close`](Self::request_close) has been called.
    pub fn close_signal(&self) -> watch::Receiver<bool> {
        self.close_tx.subscribe()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Whether frames may currently be written to this connection.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// `Connecting → Open`. Returns false if the connection already moved on.
    pub fn mark_open(&self) -> bool {
        self.state
            .compare_exchange(
                ConnectionState::Connecting as u8,
                ConnectionState::Open as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// `Connecting | Open → Closing`. Returns true only for the caller that
    /// performed the transition.
    pub fn begin_closing(&self) -> bool {
        self.state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
                match ConnectionState::from_u8(raw) {
                    ConnectionState::Connecting | ConnectionState::Open => {
                        Some(ConnectionState::Closing as u8)
                    }
                    _ => None,
                }
            })
            .is_ok()
    }

    /// Any state `→ Closed`. Returns true exactly once per connection.
    pub fn mark_closed(&self) -> bool {
        self.state.swap(ConnectionState::Closed as u8, Ordering::SeqCst)
            != ConnectionState::Closed as u8
    }

    /// Queue a text frame. Returns whether it was accepted by the queue.
    pub fn send_text(&self, text: String) -> bool {
        if !self.is_open() {
            return false;
        }
        self.try_enqueue(OutboundFrame::Text(text))
    }

    /// Queue a transport-level ping.
    pub fn send_ping(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.try_enqueue(OutboundFrame::Ping)
    }

    /// Ask the transport to close.
    ///
    /// The `Close` frame is best effort; the watch flag always lands, so the
    /// socket task stops even when the outbound queue is full.
    pub fn request_close(&self) {
        self.close_tx.send_replace(true);
        let _ = self.sender.try_send(OutboundFrame::Close);
    }

    fn try_enqueue(&self, frame: OutboundFrame) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.begin_closing();
                false
            }
        }
    }
}
