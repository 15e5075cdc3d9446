//! Poster lookup
//!
//! Posters are display-only. Providers report exactly why a lookup failed;
//! [`PosterService::resolve`] is the single place where any failure is
//! collapsed into the fallback image.
use std::{sync::Arc, time::Duration};

pub mod imdb;

pub use imdb::ImdbPosterProvider;

/// Why a poster could not be resolved
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    #[error("poster request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("poster API returned status {0}")]
    Status(u16),

    #[error("malformed poster response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("no title matched the query")]
    NoMatch,

    #[error("matched title has no image")]
    MissingImage,
}

/// Source of poster images keyed by free-text title
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Looks up the poster URL for `title`
    async fn lookup(&self, title: &str) -> Result<String, PosterError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Best-effort poster resolution with a fixed fallback image
///
/// Every lookup, cache read included, is bounded by `timeout`.
#[derive(Clone)]
pub struct PosterService {
    provider: Arc<dyn PosterProvider>,
    fallback_url: Arc<str>,
    timeout: Duration,
}

impl PosterService {
    pub fn new(
        provider: Arc<dyn PosterProvider>,
        fallback_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            fallback_url: Arc::from(fallback_url.into()),
            timeout,
        }
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    /// Poster URL for `title`, or the fallback when the lookup fails or times out
    pub async fn resolve(&self, title: &str) -> String {
        match tokio::time::timeout(self.timeout, self.provider.lookup(title)).await {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                tracing::warn!(
                    title = %title,
                    provider = self.provider.name(),
                    error = %e,
                    "Poster lookup failed, using fallback"
                );
                self.fallback_url.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    title = %title,
                    provider = self.provider.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Poster lookup timed out, using fallback"
                );
                self.fallback_url.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "https://img.test/none.png";
    const TIMEOUT: Duration = Duration::from_secs(2);

    /// Answers only after `delay`, like a provider stuck on a dead cache host
    struct SlowProvider {
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl PosterProvider for SlowProvider {
        async fn lookup(&self, _title: &str) -> Result<String, PosterError> {
            tokio::time::sleep(self.delay).await;
            Ok("https://img.test/late.jpg".to_string())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_resolve_returns_provider_url() {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_lookup()
            .with(mockall::predicate::eq("Avatar"))
            .times(1)
            .returning(|_| Ok("https://img.test/avatar.jpg".to_string()));

        let service = PosterService::new(Arc::new(provider), FALLBACK, TIMEOUT);
        assert_eq!(service.resolve("Avatar").await, "https://img.test/avatar.jpg");
    }

    #[tokio::test]
    async fn test_resolve_collapses_every_failure_to_fallback() {
        for kind in 0..4 {
            let mut provider = MockPosterProvider::new();
            provider.expect_lookup().returning(move |_| {
                Err(match kind {
                    0 => PosterError::Status(500),
                    1 => PosterError::NoMatch,
                    2 => PosterError::MissingImage,
                    _ => PosterError::Malformed(
                        serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
                    ),
                })
            });
            provider.expect_name().return_const("mock");

            let service = PosterService::new(Arc::new(provider), FALLBACK, TIMEOUT);
            assert_eq!(service.resolve("Avatar").await, FALLBACK);
        }
    }

    #[tokio::test]
    async fn test_resolve_times_out_to_fallback() {
        let provider = SlowProvider {
            delay: Duration::from_secs(5),
        };
        let service = PosterService::new(Arc::new(provider), FALLBACK, Duration::from_millis(100));

        let started = std::time::Instant::now();
        assert_eq!(service.resolve("Avatar").await, FALLBACK);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_resolve_within_timeout_keeps_url() {
        let provider = SlowProvider {
            delay: Duration::from_millis(10),
        };
        let service = PosterService::new(Arc::new(provider), FALLBACK, TIMEOUT);
        assert_eq!(service.resolve("Avatar").await, "https://img.test/late.jpg");
    }
}
