//! Storefront realtime server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use storefront_api::{AppState, build_app};
use storefront_auth::JwtDecoder;
use storefront_core::config::AppConfig;
use storefront_core::error::AppError;
use storefront_realtime::RealtimeEngine;

#[tokio::main]
async fn main() {
    let env = std::env::var("STOREFRONT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Storefront v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_default_secret() {
        tracing::warn!("auth.jwt_secret is the built-in placeholder; set STOREFRONT__AUTH__JWT_SECRET");
    }

    // ── Step 1: Credential verifier ──────────────────────────────
    let verifier = Arc::new(JwtDecoder::new(&config.auth));

    // ── Step 2: Realtime engine + heartbeat ──────────────────────
    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        verifier.clone(),
    ));
    let heartbeat = realtime.spawn_heartbeat();
    tracing::info!(
        interval_seconds = config.realtime.heartbeat_interval_seconds,
        "WebSocket heartbeat started"
    );

    // ── Step 3: HTTP server ──────────────────────────────────────
    let config = Arc::new(config);
    let app = build_app(AppState::new(config.clone(), realtime.clone(), verifier));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Storefront server listening on {}", addr);

    // ── Step 4: Graceful shutdown ────────────────────────────────
    let engine = realtime.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        // upgraded sockets are not tracked by axum; close them so serve() can finish
        if let Err(e) = engine.shutdown().await {
            tracing::error!("Realtime shutdown error: {}", e);
        }
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, heartbeat).await.is_err() {
        tracing::warn!("Heartbeat task did not stop within the grace period");
    }

    tracing::info!("Storefront server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
