use serde::{Deserialize, Serialize};

mod movie;
mod session;
mod user;

pub use movie::MovieRecord;
pub use session::Session;
pub use user::{PasswordHash, UserAccount};

/// A single recommended title returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    /// Similarity of this title to the query title
    pub score: f64,
    /// Poster image, or the fallback placeholder when none could be resolved
    pub poster_url: String,
}

/// Recommendation request body
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
    /// Number of recommendations; the configured default applies when absent
    #[serde(default)]
    pub k: Option<usize>,
}

/// Signup and login request body
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}
