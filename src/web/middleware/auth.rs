//! Manager authentication extractors.
//!
//! Both extractors run the authentication gate on the bearer token carried in
//! the `Authorization` header. They differ only in the access policy applied.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::auth::{AccessPolicy, Principal};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// A manager holding any active session, FULL or RESET.
///
/// Only the password update and logout routes accept RESET sessions.
#[derive(Debug, Clone)]
pub struct AuthManager(pub Principal);

/// A manager holding an active FULL session.
#[derive(Debug, Clone)]
pub struct FullManager(pub Principal);

/// Token from `Authorization: Bearer <token>`, if present.
pub fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

async fn authenticate(
    parts: &Parts,
    state: &AppState,
    policy: AccessPolicy,
) -> Result<Principal, ApiError> {
    let token = bearer_token(parts);
    let principal = state.gate.require(token.as_deref(), policy).await?;
    Ok(principal)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthManager {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, AccessPolicy::Authenticated)
            .await
            .map(AuthManager)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for FullManager {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, AccessPolicy::Full)
            .await
            .map(FullManager)
    }
}
