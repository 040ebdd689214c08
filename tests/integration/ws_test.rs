//! Integration tests for WebSocket connection and messaging.

mod helpers;

use std::time::Duration;

use serde_json::json;

use helpers::{TestApp, WsClient, test_config};

#[tokio::test]
async fn test_connect_announces_client_id() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    let client = WsClient::connect(addr).await;

    assert_eq!(client.client_id.len(), 36);
    app.wait_for_connections(1).await;
}

#[tokio::test]
async fn test_room_broadcast_reaches_all_members() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    let mut a = WsClient::connect(addr).await;
    let mut b = WsClient::connect(addr).await;
    let mut outsider = WsClient::connect(addr).await;
    a.subscribe("lobby").await;
    b.subscribe("lobby").await;
    let a_id = a.client_id.clone();

    a.send_json(json!({"type": "broadcast", "room": "lobby", "payload": {"x": 1}}))
        .await;

    for client in [&mut a, &mut b] {
        let frame = client.recv_json().await;
        assert_eq!(frame["type"], "message");
        assert_eq!(frame["room"], "lobby");
        assert_eq!(frame["payload"], json!({"x": 1}));
        assert_eq!(frame["sender"], a_id.as_str());
        assert!(frame["timestamp"].as_str().unwrap().ends_with('Z'));
    }
    assert!(
        outsider
            .try_recv_json(Duration::from_millis(200))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_sender_id_matches_connected_frame() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    let mut a = WsClient::connect(addr).await;
    let mut b = WsClient::connect(addr).await;
    b.subscribe("products").await;

    a.send_json(json!({"type": "broadcast", "room": "products", "payload": "restocked"}))
        .await;

    let frame = b.recv_json().await;
    assert_eq!(frame["sender"], a.client_id.as_str());
    assert_eq!(frame["payload"], "restocked");
}

#[tokio::test]
async fn test_disconnect_leaves_rooms() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    let mut a = WsClient::connect(addr).await;
    let mut b = WsClient::connect(addr).await;
    a.subscribe("lobby").await;
    b.subscribe("lobby").await;

    a.close().await;
    app.wait_for_connections(1).await;

    let stats = app.realtime.stats().await;
    assert_eq!(stats.rooms, 1);
    assert_eq!(stats.room_members[0].members, 1);

    b.send_json(json!({"type": "broadcast", "room": "lobby", "payload": {"x": 1}}))
        .await;
    let frame = b.recv_json().await;
    assert_eq!(frame["sender"], b.client_id.as_str());
}

#[tokio::test]
async fn test_last_disconnect_collects_room() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    let mut a = WsClient::connect(addr).await;
    a.subscribe("lobby").await;
    assert_eq!(app.realtime.registry.room_count().await, 1);

    a.close().await;
    app.wait_for_connections(0).await;
    assert_eq!(app.realtime.registry.room_count().await, 0);
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    let mut a = WsClient::connect(addr).await;
    let mut b = WsClient::connect(addr).await;
    a.subscribe("lobby").await;
    b.subscribe("lobby").await;

    b.send_json(json!({"type": "unsubscribe", "room": "lobby"}))
        .await;
    // unsubscribe has no acknowledgement; the broadcast below is ordered after it
    b.send_json(json!({"type": "broadcast", "room": "lobby", "payload": 1}))
        .await;

    assert_eq!(a.recv_json().await["payload"], 1);
    assert!(b.try_recv_json(Duration::from_millis(200)).await.is_none());
}

#[tokio::test]
async fn test_authenticate_rejects_then_accepts() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let mut client = WsClient::connect(addr).await;

    client
        .send_json(json!({"type": "authenticate", "token": "not-a-jwt"}))
        .await;
    assert_eq!(
        client.recv_json().await,
        json!({"type": "auth_error", "message": "Invalid token"})
    );

    let token = app.token_for(42u64);
    client
        .send_json(json!({"type": "authenticate", "token": token}))
        .await;
    let reply = client.recv_json().await;
    assert_eq!(reply["type"], "authenticated");
    assert_eq!(reply["userId"], "42");

    let stats = app.realtime.stats().await;
    assert_eq!(stats.metrics.auth_failures, 1);
}

#[tokio::test]
async fn test_bad_frames_do_not_close_connection() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let mut client = WsClient::connect(addr).await;

    client.send_raw("not json").await;
    client.send_raw(r#"{"type":"dance","moves":3}"#).await;
    client.send_json(json!({"type": "subscribe"})).await;
    client
        .send_json(json!({"type": "broadcast", "room": "lobby"}))
        .await;

    client.subscribe("lobby").await;
    assert_eq!(app.realtime.stats().await.metrics.malformed_frames, 1);
}

#[tokio::test]
async fn test_binary_frames_are_dispatched() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let mut client = WsClient::connect(addr).await;

    client
        .send_binary(br#"{"type":"subscribe","room":"orders"}"#.to_vec())
        .await;

    let ack = client.recv_json().await;
    assert_eq!(ack["type"], "subscribed");
    assert_eq!(ack["room"], "orders");
}

#[tokio::test]
async fn test_binary_frames_must_be_utf8() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let mut client = WsClient::connect(addr).await;

    client
        .send_binary(b"{\"type\":\"subscribe\",\"room\":\"lo\xFFby\"}".to_vec())
        .await;
    assert!(
        client
            .try_recv_json(Duration::from_millis(200))
            .await
            .is_none()
    );

    client.subscribe("lobby").await;
    let stats = app.realtime.stats().await;
    assert_eq!(stats.metrics.malformed_frames, 1);
    assert_eq!(stats.rooms, 1);
    assert_eq!(stats.room_members[0].name, "lobby");
}

#[tokio::test]
async fn test_server_broadcast_reaches_socket_clients() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let mut client = WsClient::connect(addr).await;
    client.subscribe("products").await;

    let token = app.token_for("admin");
    let event = json!({"type": "product_created", "product": {"id": 7, "name": "Lamp"}});
    let response = app
        .request(
            "POST",
            "/api/rooms/products/broadcast",
            Some(event.clone()),
            Some(&token),
        )
        .await;

    assert_eq!(response.body["delivered"], 1);
    assert_eq!(client.recv_json().await, event);
}

#[tokio::test]
async fn test_responsive_client_survives_heartbeat() {
    let mut config = test_config();
    config.realtime.heartbeat_interval_seconds = 1;
    config.realtime.heartbeat_timeout_seconds = 1;
    let app = TestApp::with_config(config);
    let _heartbeat = app.realtime.spawn_heartbeat();
    let addr = app.spawn_server().await;

    let mut client = WsClient::connect(addr).await;
    // reading keeps the client answering pings
    let pings = client.count_pings(Duration::from_millis(3500)).await;

    assert!(pings >= 2, "expected at least two pings, saw {pings}");
    assert_eq!(app.realtime.registry.connection_count().await, 1);
}

#[tokio::test]
async fn test_silent_client_is_reaped() {
    let mut config = test_config();
    config.realtime.heartbeat_interval_seconds = 1;
    config.realtime.heartbeat_timeout_seconds = 1;
    let app = TestApp::with_config(config);
    let _heartbeat = app.realtime.spawn_heartbeat();
    let addr = app.spawn_server().await;

    let mut client = WsClient::connect(addr).await;
    client.subscribe("lobby").await;

    // no reads, so no pongs
    tokio::time::sleep(Duration::from_millis(3500)).await;

    app.wait_for_connections(0).await;
    assert_eq!(app.realtime.registry.room_count().await, 0);
    assert!(app.realtime.stats().await.metrics.heartbeat_timeouts >= 1);
}
