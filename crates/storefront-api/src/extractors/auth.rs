//! `AuthSubject` extractor: pulls the bearer token from the Authorization header and verifies it.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use storefront_core::error::AppError;
use storefront_core::types::SubjectId;

use crate::error::ApiError;
use crate::state::AppState;

/// Subject resolved from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthSubject(pub SubjectId);

impl FromRequestParts<AppState> for AuthSubject {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::authentication("Missing or malformed Authorization header"))?;

        let subject = state.verifier.verify(token).await?;
        Ok(AuthSubject(subject))
    }
}

/// Returns the token of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
