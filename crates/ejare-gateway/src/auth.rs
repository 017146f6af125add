//! Bearer-token auth gate. Two variants: any authenticated role, and
//! admin-only (the any-role gate plus a role check).

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use ejare_auth::Claims;

use crate::error::ApiError;
use crate::server::AppState;

/// Verified claims of any authenticated caller.
pub struct AuthClaims(pub Claims);

/// Verified claims of an admin caller.
pub struct AdminClaims(pub Claims);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<Arc<AppState>> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let claims = state.tokens.verify(token).map_err(|_| ApiError::Unauthorized)?;
        Ok(Self(claims))
    }
}

impl FromRequestParts<Arc<AppState>> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthClaims(claims) = AuthClaims::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(claims))
    }
}
