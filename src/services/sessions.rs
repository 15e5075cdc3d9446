use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Session;

/// In-memory registry of logged-in sessions keyed by token
///
/// Sessions expire `ttl` after login. Expired tokens are rejected on lookup
/// and swept out whenever a new session is opened.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        // A clock step backwards gives a negative age; count it as fresh.
        let age = (now - session.created_at).to_std().unwrap_or(Duration::ZERO);
        age >= self.ttl
    }

    /// Opens a session for an already verified user
    pub async fn create(&self, username: &str) -> Session {
        let session = Session::new(username.to_string());

        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, existing| !self.is_expired(existing, now));
        let pruned = before - sessions.len();
        sessions.insert(session.token, session.clone());
        drop(sessions);

        if pruned > 0 {
            tracing::debug!(pruned = pruned, "Expired sessions removed");
        }
        tracing::info!(username = %username, "Session opened");

        session
    }

    /// Live session for `token`; `None` when unknown or expired
    pub async fn get(&self, token: &Uuid) -> Option<Session> {
        self.inner
            .read()
            .await
            .get(token)
            .filter(|session| !self.is_expired(session, Utc::now()))
            .cloned()
    }

    /// Ends a session; returns whether it existed
    pub async fn remove(&self, token: &Uuid) -> bool {
        match self.inner.write().await.remove(token) {
            Some(session) => {
                tracing::info!(username = %session.username, "Session closed");
                true
            }
            None => false,
        }
    }
}
