use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    error::{AppError, AppResult},
    middleware::{CurrentSession, RequestId},
    models::{Recommendation, RecommendationRequest},
    routes::AppState,
    services::recommendations,
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let k = request.k.unwrap_or(state.default_k);
    if k == 0 {
        return Err(AppError::InvalidInput("k must be at least 1".to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        username = %session.username,
        title = %request.title,
        k = k,
        "Processing recommendation request"
    );

    let recommendations =
        recommendations::get_recommendations(&state.engine, &state.posters, &request.title, k)
            .await?;

    Ok(Json(recommendations))
}
