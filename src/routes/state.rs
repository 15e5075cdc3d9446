use std::sync::Arc;

use crate::services::{
    CredentialStore, PosterService, RecommendationEngine, SessionStore, SimilarityIndex,
};

/// Shared application state
///
/// Everything here is either read-only after startup or synchronizes
/// internally, so handlers share it through an `Arc`.
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub engine: RecommendationEngine,
    pub posters: PosterService,
    pub sessions: SessionStore,
    /// Recommendation count used when a request does not set `k`
    pub default_k: usize,
}

impl AppState {
    pub fn new(
        credentials: CredentialStore,
        index: SimilarityIndex,
        posters: PosterService,
        sessions: SessionStore,
        default_k: usize,
    ) -> Self {
        Self {
            credentials: Arc::new(credentials),
            engine: RecommendationEngine::new(Arc::new(index)),
            posters,
            sessions,
            default_k,
        }
    }
}
