//! Collaborator traits defined in `storefront-core` and implemented by other crates.

pub mod verifier;

pub use verifier::CredentialVerifier;
