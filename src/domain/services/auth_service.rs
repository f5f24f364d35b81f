use std::sync::Arc;
use crate::domain::{models::session::SessionRecord, ports::SessionStore};
use crate::error::AppError;
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Sha256, Digest};

pub const SESSION_COOKIE: &str = "sid";

pub struct AuthService {
    store: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn SessionStore>, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Returns the raw session id to be placed in the cookie.
    pub async fn create_session(&self, user_id: &str) -> Result<String, AppError> {
        let session_id: String = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        let record = SessionRecord::new(user_id.to_string(), self.session_ttl);
        self.store.set(&self.hash_token(&session_id), record).await?;
        Ok(session_id)
    }

    /// Resolves a raw session id to its user id. Expired sessions are destroyed on sight.
    pub async fn resolve(&self, raw_session_id: &str) -> Result<Option<String>, AppError> {
        let key = self.hash_token(raw_session_id);
        match self.store.get(&key).await? {
            Some(record) if record.is_expired(Utc::now()) => {
                self.store.destroy(&key).await?;
                Ok(None)
            }
            Some(record) => Ok(Some(record.user_id)),
            None => Ok(None),
        }
    }

    pub async fn destroy(&self, raw_session_id: &str) -> Result<(), AppError> {
        self.store.destroy(&self.hash_token(raw_session_id)).await
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
