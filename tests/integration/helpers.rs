//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use storefront_api::{AppState, build_app};
use storefront_auth::{JwtDecoder, JwtEncoder};
use storefront_core::config::AppConfig;
use storefront_core::types::SubjectId;
use storefront_realtime::RealtimeEngine;

/// Signing secret shared by the test server and the token issuer.
pub const TEST_SECRET: &str = "integration-test-secret";

/// How long a client waits for an expected frame.
const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Realtime engine behind the router
    pub realtime: Arc<RealtimeEngine>,
    /// Application config
    pub config: Arc<AppConfig>,
    /// Issues tokens the server accepts
    pub encoder: JwtEncoder,
}

/// Config used by every test app: known secret, quiet heartbeat.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.realtime.heartbeat_interval_seconds = 60;
    config
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from an explicit config
    pub fn with_config(config: AppConfig) -> Self {
        let verifier = Arc::new(JwtDecoder::new(&config.auth));
        let encoder = JwtEncoder::new(&config.auth);
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), verifier.clone()));
        let config = Arc::new(config);
        let router = build_app(AppState::new(config.clone(), realtime.clone(), verifier));

        Self {
            router,
            realtime,
            config,
            encoder,
        }
    }

    /// Issue a valid token for `subject`
    pub fn token_for(&self, subject: impl Into<SubjectId>) -> String {
        self.encoder
            .issue(&subject.into(), Some("shopper@example.com"))
            .expect("Failed to issue token")
            .0
    }

    /// Serve the router on an ephemeral local port
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let router = self.router.clone();

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Test server failed");
        });

        addr
    }

    /// Poll the registry until it holds `expected` connections
    pub async fn wait_for_connections(&self, expected: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let count = self.realtime.registry.connection_count().await;
            if count == expected {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {expected} connections, registry holds {count}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// A WebSocket client talking to a spawned test server.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// `clientId` announced in the `connected` frame
    pub client_id: String,
}

impl WsClient {
    /// Connect and consume the `connected` greeting
    pub async fn connect(addr: SocketAddr) -> Self {
        let (stream, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .expect("WebSocket handshake failed");

        let mut client = Self {
            stream,
            client_id: String::new(),
        };
        let greeting = client.recv_json().await;
        assert_eq!(greeting["type"], "connected");
        client.client_id = greeting["clientId"]
            .as_str()
            .expect("clientId is a string")
            .to_string();
        client
    }

    /// Send a JSON text frame
    pub async fn send_json(&mut self, value: Value) {
        self.stream
            .send(Message::text(value.to_string()))
            .await
            .expect("Failed to send frame");
    }

    /// Send a raw text frame
    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::text(text))
            .await
            .expect("Failed to send frame");
    }

    /// Send a binary frame
    pub async fn send_binary(&mut self, bytes: Vec<u8>) {
        self.stream
            .send(Message::binary(bytes))
            .await
            .expect("Failed to send frame");
    }

    /// Next text frame parsed as JSON; control frames are skipped
    pub async fn recv_json(&mut self) -> Value {
        self.try_recv_json(RECV_TIMEOUT)
            .await
            .expect("timed out waiting for a text frame")
    }

    /// Next text frame within `wait`, if any
    pub async fn try_recv_json(&mut self, wait: Duration) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let next = tokio::time::timeout_at(deadline, self.stream.next()).await.ok()??;
            match next.expect("WebSocket read failed") {
                Message::Text(text) => {
                    return Some(serde_json::from_str(text.as_str()).expect("frame is JSON"));
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Read for `wait`, returning the number of pings seen
    pub async fn count_pings(&mut self, wait: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + wait;
        let mut pings = 0;
        while let Ok(Some(Ok(msg))) = tokio::time::timeout_at(deadline, self.stream.next()).await {
            if matches!(msg, Message::Ping(_)) {
                pings += 1;
            }
        }
        pings
    }

    /// Subscribe and wait for the acknowledgement
    pub async fn subscribe(&mut self, room: &str) {
        self.send_json(serde_json::json!({"type": "subscribe", "room": room}))
            .await;
        let ack = self.recv_json().await;
        assert_eq!(ack["type"], "subscribed");
        assert_eq!(ack["room"], room);
    }

    /// Close the connection from the client side
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
