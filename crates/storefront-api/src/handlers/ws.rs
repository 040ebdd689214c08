//! WebSocket upgrade handler.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{FutureExt, SinkExt, StreamExt};
use tracing::{debug, error, warn};

use storefront_realtime::OutboundFrame;

use crate::state::AppState;

/// How long a server-initiated close waits for the writer to flush.
const CLOSE_FLUSH: Duration = Duration::from_secs(1);

/// GET /ws: WebSocket upgrade. Authentication happens in-band.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Pumps one established WebSocket until either side goes away.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let connections = state.realtime.connections.clone();

    let (handle, mut outbound_rx) = match connections.accept().await {
        Ok(accepted) => accepted,
        Err(e) => {
            error!(error = %e, "Failed to register WebSocket connection");
            return;
        }
    };
    let conn_id = handle.id();
    let mut close_signal = handle.close_signal();
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer: drains the outbound queue until it is closed or a Close frame is requested
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let msg = match frame {
                OutboundFrame::Text(text) => Message::Text(text.into()),
                OutboundFrame::Ping => Message::Ping(Bytes::new()),
                OutboundFrame::Close => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            };
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut server_closed = false;
    loop {
        tokio::select! {
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    connections.handle_inbound(&conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Binary(data))) => {
                    connections.handle_inbound_bytes(&conn_id, &data).await;
                }
                Some(Ok(Message::Pong(_))) => connections.record_pong(&conn_id).await,
                // axum answers pings itself
                Some(Ok(Message::Ping(_))) => {}
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = &mut writer => {
                debug!(conn_id = %conn_id, "WebSocket writer finished");
                break;
            }
            _ = close_signal.wait_for(|closing| *closing).map(|_| ()) => {
                debug!(conn_id = %conn_id, "Server closed WebSocket");
                server_closed = true;
                break;
            }
        }
    }

    // let a queued Close frame go out unless the peer stopped reading
    if server_closed && tokio::time::timeout(CLOSE_FLUSH, &mut writer).await.is_err() {
        debug!(conn_id = %conn_id, "WebSocket writer stalled, dropping socket");
    }

    connections.close(&handle).await;
    writer.abort();
}
