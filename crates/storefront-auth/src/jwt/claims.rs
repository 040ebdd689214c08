//! JWT claims structure carried by bearer tokens.

use serde::{Deserialize, Serialize};

use storefront_core::types::SubjectId;

/// Claims payload embedded in every bearer token.
///
/// Field names follow the tokens issued by the storefront auth routes:
/// `userId`, `email`, `iat`, `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user) the token was issued for.
    #[serde(rename = "userId")]
    pub user_id: SubjectId,
    /// Email address at issuance time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}
