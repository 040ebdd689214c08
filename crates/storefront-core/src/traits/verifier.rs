//! Credential verifier trait for opaque bearer tokens.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::SubjectId;

/// Resolves an opaque bearer credential to the subject it was issued for.
///
/// Implementations return an [`ErrorKind::Authentication`] error for any
/// token they cannot vouch for (bad signature, expired, malformed, ...).
///
/// [`ErrorKind::Authentication`]: crate::error::ErrorKind::Authentication
#[async_trait]
pub trait CredentialVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verify `token` and return its subject identifier.
    async fn verify(&self, token: &str) -> AppResult<SubjectId>;
}
