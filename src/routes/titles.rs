use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{middleware::CurrentSession, models::MovieRecord, routes::AppState};

/// Lists the catalog in catalog order, for title pickers
pub async fn list(
    State(state): State<Arc<AppState>>,
    _session: CurrentSession,
) -> Json<Vec<MovieRecord>> {
    Json(state.engine.index().catalog().to_vec())
}
