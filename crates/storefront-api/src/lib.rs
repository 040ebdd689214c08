//! # storefront-api
//!
//! HTTP API layer for Storefront built on Axum.
//!
//! Provides the WebSocket upgrade that feeds the realtime engine, health and
//! stats endpoints, the server-side room broadcast route, CORS and request
//! tracing, extractors, and error mapping.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
