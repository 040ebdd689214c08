//! Integration tests for the HTTP surface: service info, health, stats, room broadcast.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use storefront_realtime::OutboundFrame;

use helpers::TestApp;

#[tokio::test]
async fn test_root_reports_service() {
    let app = TestApp::new();

    let response = app.request("GET", "/", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "running");
    assert!(response.body["service"].is_string());
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_reports_live_counts() {
    let app = TestApp::new();
    let (handle, _rx) = app.realtime.connections.accept().await.unwrap();
    app.realtime.registry.join(&handle.id(), "lobby").await;

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["ws_connections"], 1);
    assert_eq!(response.body["rooms"], 1);
    assert!(response.body["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_stats_lists_rooms() {
    let app = TestApp::new();
    let (a, _rx_a) = app.realtime.connections.accept().await.unwrap();
    let (b, _rx_b) = app.realtime.connections.accept().await.unwrap();
    app.realtime.registry.join(&a.id(), "products").await;
    app.realtime.registry.join(&b.id(), "products").await;
    app.realtime.registry.join(&b.id(), "lobby").await;

    let response = app.request("GET", "/api/realtime/stats", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["connections"], 2);
    assert_eq!(response.body["rooms"], 2);
    assert_eq!(
        response.body["room_members"],
        json!([{"name": "lobby", "members": 1}, {"name": "products", "members": 2}])
    );
    assert_eq!(response.body["metrics"]["connections_total"], 2);
}

#[tokio::test]
async fn test_broadcast_requires_bearer_token() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/api/rooms/lobby/broadcast", Some(json!({"x": 1})), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_broadcast_rejects_forged_token() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/rooms/lobby/broadcast",
            Some(json!({"x": 1})),
            Some("eyJhbGciOiJIUzI1NiJ9.e30.forged"),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_broadcast_to_empty_room_delivers_nothing() {
    let app = TestApp::new();
    let token = app.token_for(1u64);

    let response = app
        .request(
            "POST",
            "/api/rooms/nonexistent-room/broadcast",
            Some(json!({"x": 1})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"room": "nonexistent-room", "delivered": 0})
    );
}

#[tokio::test]
async fn test_broadcast_queues_document_unchanged() {
    let app = TestApp::new();
    let token = app.token_for(1u64);
    let (handle, mut rx) = app.realtime.connections.accept().await.unwrap();
    app.realtime.registry.join(&handle.id(), "orders").await;
    // drop the greeting
    rx.try_recv().unwrap();

    let event = json!({"type": "order_created", "order": {"id": 99}});
    let response = app
        .request(
            "POST",
            "/api/rooms/orders/broadcast",
            Some(event.clone()),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["delivered"], 1);
    match rx.try_recv().unwrap() {
        OutboundFrame::Text(text) => {
            assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), event)
        }
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_get_on_ws_route_is_rejected() {
    let app = TestApp::new();

    let response = app.request("GET", "/ws", None, None).await;

    assert!(
        response.status.is_client_error(),
        "expected a 4xx without upgrade headers, got {}",
        response.status
    );
}
