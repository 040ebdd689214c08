//! # storefront-core
//!
//! Core crate for the Storefront backend. Contains configuration schemas,
//! typed identifiers, the collaborator traits the realtime engine consumes,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Storefront crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
