use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{error::AppError, models::Session, routes::AppState};

const BEARER_PREFIX: &str = "Bearer ";

/// The caller's session, resolved from an `Authorization: Bearer <token>` header
///
/// Handlers that take this extractor reject unauthenticated requests with 401.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

/// Parses the session token out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .and_then(|token| Uuid::parse_str(token.trim()).ok())
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;

        state
            .sessions
            .get(&token)
            .await
            .map(CurrentSession)
            .ok_or(AppError::Unauthorized)
    }
}
