use std::{cmp::Ordering, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
    services::{posters::PosterService, similarity::SimilarityIndex},
};

/// Number of recommendations when the caller does not ask for a specific count
pub const DEFAULT_K: usize = 5;

/// A ranked candidate with its similarity to the query title
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTitle {
    pub index: usize,
    pub title: String,
    pub score: f64,
}

/// Top-K retrieval over the precomputed similarity matrix
#[derive(Clone)]
pub struct RecommendationEngine {
    index: Arc<SimilarityIndex>,
}

impl RecommendationEngine {
    pub fn new(index: Arc<SimilarityIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    /// Titles most similar to `title`, best first, at most `k` of them
    pub fn recommend(&self, title: &str, k: usize) -> AppResult<Vec<String>> {
        Ok(self
            .recommend_scored(title, k)?
            .into_iter()
            .map(|scored| scored.title)
            .collect())
    }

    /// Ranks the whole catalog against `title` and keeps the `k` entries after the first
    ///
    /// The sort is stable, so equal scores (`0.0` and `-0.0` included) keep
    /// catalog order. Scores are finite, so `partial_cmp` always succeeds. The
    /// top-ranked entry is dropped by position, which is the query itself
    /// unless another title ties with or beats its self-similarity.
    pub fn recommend_scored(&self, title: &str, k: usize) -> AppResult<Vec<ScoredTitle>> {
        let query = self.index.resolve_index(title)?;
        let mut ranked = self.index.row(query)?;

        if ranked.len() != self.index.len() {
            return Err(AppError::Integrity(format!(
                "similarity row {} has {} entries, catalog has {}",
                query,
                ranked.len(),
                self.index.len()
            )));
        }

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        ranked
            .into_iter()
            .skip(1)
            .take(k)
            .map(|(index, score)| {
                let title = self.index.title(index).ok_or_else(|| {
                    AppError::Integrity(format!("candidate {} missing from catalog", index))
                })?;
                Ok(ScoredTitle {
                    index,
                    title: title.to_string(),
                    score,
                })
            })
            .collect()
    }
}

/// Recommends titles for `title` and attaches a poster to each
///
/// Posters are looked up concurrently; a lookup that fails for any reason
/// yields the fallback image instead of an error.
pub async fn get_recommendations(
    engine: &RecommendationEngine,
    posters: &PosterService,
    title: &str,
    k: usize,
) -> AppResult<Vec<Recommendation>> {
    let ranked = engine.recommend_scored(title, k)?;

    let tasks: Vec<_> = ranked
        .iter()
        .map(|scored| {
            let posters = posters.clone();
            let title = scored.title.clone();
            tokio::spawn(async move { posters.resolve(&title).await })
        })
        .collect();

    let mut recommendations = Vec::with_capacity(ranked.len());
    for (scored, task) in ranked.into_iter().zip(tasks) {
        let poster_url = match task.await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, title = %scored.title, "Poster task join error");
                posters.fallback_url().to_string()
            }
        };

        recommendations.push(Recommendation {
            title: scored.title,
            score: scored.score,
            poster_url,
        });
    }

    tracing::info!(
        query = %title,
        results = recommendations.len(),
        "Recommendations computed"
    );

    Ok(recommendations)
}
