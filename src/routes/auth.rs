use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::{CurrentSession, RequestId},
    models::CredentialsRequest,
    routes::AppState,
    services::CredentialStore,
};

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Runs a credential-store call on the blocking pool
async fn with_store<T, F>(store: &Arc<CredentialStore>, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&CredentialStore) -> AppResult<T> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}

/// Handler for account creation
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let username = request.username.clone();

    let created = with_store(&state.credentials, move |store| {
        store.create(&request.username, &request.password)
    })
    .await?;

    if !created {
        tracing::warn!(request_id = %request_id, username = %username, "Duplicate signup");
        return Err(AppError::DuplicateAccount(username));
    }

    Ok((StatusCode::CREATED, Json(SignupResponse { username })))
}

/// Handler for login; issues a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<Json<LoginResponse>> {
    let username = request.username.clone();

    let verified = with_store(&state.credentials, move |store| {
        store.verify(&request.username, &request.password)
    })
    .await?;

    if !verified {
        tracing::info!(request_id = %request_id, "Login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let session = state.sessions.create(&username).await;

    Ok(Json(LoginResponse {
        token: session.token,
        username: session.username,
    }))
}

/// Handler for logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> StatusCode {
    state.sessions.remove(&session.token).await;
    StatusCode::NO_CONTENT
}

/// Returns the logged-in user
pub async fn me(CurrentSession(session): CurrentSession) -> Json<MeResponse> {
    Json(MeResponse {
        username: session.username,
        created_at: session.created_at,
    })
}
