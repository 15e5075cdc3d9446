//! IMDb API poster provider
//!
//! Searches `{api_url}/search/titles?query=<title>&limit=1` and takes the
//! primary image of the first hit. Successful lookups are cached for a week.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    services::posters::{PosterError, PosterProvider},
};

const POSTER_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Clone)]
pub struct ImdbPosterProvider {
    http_client: HttpClient,
    api_url: String,
    cache: Cache,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    titles: Vec<SearchTitle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchTitle {
    #[serde(default)]
    primary_image: Option<PrimaryImage>,
}

#[derive(Debug, Deserialize)]
struct PrimaryImage {
    #[serde(default)]
    url: Option<String>,
}

impl ImdbPosterProvider {
    /// Creates a provider whose requests give up after `timeout`
    pub fn new(cache: Cache, api_url: String, timeout: Duration) -> Result<Self, PosterError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    async fn fetch(&self, title: &str) -> Result<String, PosterError> {
        let url = format!("{}/search/titles", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("query", title), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PosterError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let poster = extract_poster_url(&body)?;

        tracing::debug!(title = %title, provider = "imdb", "Poster resolved");

        Ok(poster)
    }
}

/// Pulls `titles[0].primaryImage.url` out of a search response body
fn extract_poster_url(body: &str) -> Result<String, PosterError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let first = response
        .titles
        .into_iter()
        .next()
        .ok_or(PosterError::NoMatch)?;

    first
        .primary_image
        .and_then(|image| image.url)
        .filter(|url| !url.is_empty())
        .ok_or(PosterError::MissingImage)
}

#[async_trait::async_trait]
impl PosterProvider for ImdbPosterProvider {
    async fn lookup(&self, title: &str) -> Result<String, PosterError> {
        cached!(
            self.cache,
            CacheKey::Poster(title.to_string()),
            POSTER_CACHE_TTL,
            self.fetch(title)
        )
    }

    fn name(&self) -> &'static str {
        "imdb"
    }
}
