use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use time::OffsetDateTime;
use tracing::warn;

use crate::{
    auth::{jwt::TokenError, repo_types::UserId},
    error::ApiError,
    state::AppState,
};

/// Extracts and validates the bearer token, returning the user ID.
#[derive(Debug)]
pub struct AuthUser(pub UserId);

impl AuthUser {
    /// Tokens only grant access to their own user's data.
    pub fn ensure_owner(&self, user_id: UserId) -> Result<(), ApiError> {
        if self.0 == user_id {
            Ok(())
        } else {
            warn!(token_user = self.0, requested = user_id, "cross-user access denied");
            Err(ApiError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized("Missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthorized("Invalid auth scheme"))?;

        match state.tokens.verify(token.trim(), OffsetDateTime::now_utc()) {
            Ok(user_id) => Ok(AuthUser(user_id)),
            Err(TokenError::Expired) => Err(ApiError::Unauthorized("Token expired")),
            Err(e) => {
                warn!(error = %e, "rejected bearer token");
                Err(ApiError::Unauthorized("Invalid token"))
            }
        }
    }
}
