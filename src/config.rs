use serde::Deserialize;

use crate::services::recommendations::DEFAULT_K;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// CSV file holding the registered accounts
    #[serde(default = "default_users_file")]
    pub users_file: String,

    /// JSON catalog artifact: `[{"index": 0, "title": "..."}, ...]`
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// JSON similarity artifact: N×N array of scores
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Base URL of the title search API used for posters
    #[serde(default = "default_poster_api_url")]
    pub poster_api_url: String,

    /// Image served when no poster can be resolved
    #[serde(default = "default_poster_fallback_url")]
    pub poster_fallback_url: String,

    /// Upper bound for a single poster lookup, cache read included
    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// Redis connection URL; poster caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Number of recommendations returned when the request does not say
    #[serde(default = "default_recommend_k")]
    pub recommend_k: usize,

    /// Lifetime of a login session, counted from login
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_users_file() -> String {
    "users.csv".to_string()
}

fn default_catalog_path() -> String {
    "movie_dict.json".to_string()
}

fn default_similarity_path() -> String {
    "similarity.json".to_string()
}

fn default_poster_api_url() -> String {
    "https://api.imdbapi.dev".to_string()
}

fn default_poster_fallback_url() -> String {
    "https://via.placeholder.com/300x450.png?text=No+Poster".to_string()
}

fn default_poster_timeout_secs() -> u64 {
    5
}

fn default_recommend_k() -> usize {
    DEFAULT_K
}

fn default_session_ttl_secs() -> u64 {
    86400 // 1 day
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.recommend_k == 0 {
            anyhow::bail!("RECOMMEND_K must be at least 1");
        }
        if config.session_ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be at least 1");
        }

        Ok(config)
    }
}
