//! Axum middleware stack.

pub mod cors;
