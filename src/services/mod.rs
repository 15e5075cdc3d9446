pub mod credentials;
pub mod posters;
pub mod recommendations;
pub mod sessions;
pub mod similarity;

pub use credentials::CredentialStore;
pub use posters::{ImdbPosterProvider, PosterProvider, PosterService};
pub use recommendations::RecommendationEngine;
pub use sessions::SessionStore;
pub use similarity::SimilarityIndex;
