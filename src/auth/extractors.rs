use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::{
    auth::jwt::{JwtKeys, TokenError},
    error::AppError,
};

/// Extracts and validates the bearer token, yielding the email it was issued for.
pub struct AuthUser(pub String);

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Missing => AppError::Forbidden(e.to_string()),
            TokenError::Expired | TokenError::Invalid => {
                AppError::Unauthorized(TokenError::Invalid.to_string())
            }
        }
    }
}

/// Splits `Bearer <token>`; an absent or blank header counts as no token at all.
pub(crate) fn bearer_token(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty());
    let Some(header) = header else {
        return Err(TokenError::Missing);
    };
    let (scheme, token) = header.split_once(' ').ok_or(TokenError::Invalid)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::Invalid);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Invalid);
    }
    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(v) => Some(v.to_str().map_err(|_| AppError::from(TokenError::Invalid))?),
            None => None,
        };

        let token = bearer_token(header).map_err(|e| {
            warn!(reason = %e, "bearer token rejected");
            e
        })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(reason = %e, "invalid or expired token");
            e
        })?;

        Ok(AuthUser(claims.email))
    }
}
