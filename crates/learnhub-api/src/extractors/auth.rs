//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! verifies it and resolves the caller's organization.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use learnhub_auth::{Permission, Principal};
use learnhub_core::error::AppError;
use learnhub_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated, tenant-resolved caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }

    /// Fail with 403 unless the caller's role grants `permission`.
    pub fn require(&self, state: &AppState, permission: Permission) -> Result<(), AppError> {
        state.services.authorize(&self.0, permission)
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Token part of a `Bearer` Authorization header.
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.jwt_decoder.decode(token)?;
        let ctx = state.services.context(Principal::from(claims)).await?;
        Ok(AuthUser(ctx))
    }
}
