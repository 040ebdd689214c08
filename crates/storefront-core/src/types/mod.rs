//! Core type definitions used across the Storefront workspace.

pub mod id;

pub use id::*;
