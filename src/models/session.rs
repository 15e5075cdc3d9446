use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An authenticated login, identified by an opaque bearer token
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    pub token: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Starts a new session for `username` with a random token
    pub fn new(username: String) -> Self {
        Self {
            token: Uuid::new_v4(),
            username,
            created_at: Utc::now(),
        }
    }
}
