//! # storefront-auth
//!
//! Bearer credential handling for the Storefront backend.
//!
//! - `jwt`: HS256 token verification ([`JwtDecoder`], the production
//!   [`CredentialVerifier`](storefront_core::traits::CredentialVerifier))
//!   and token issuance ([`JwtEncoder`]) for development and tests.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
