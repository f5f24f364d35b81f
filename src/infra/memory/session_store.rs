use std::collections::HashMap;
use std::sync::Mutex;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::{models::session::SessionRecord, ports::SessionStore};
use crate::error::AppError;

/// Process-local session store with a capacity cap.
///
/// Sessions do not survive a restart and are not shared between instances.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    max_entries: usize,
}

impl InMemorySessionStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, SessionRecord>>, AppError> {
        self.sessions.lock().map_err(|_| AppError::InternalWithMsg("Session store lock poisoned".into()))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<SessionRecord>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, record: SessionRecord) -> Result<(), AppError> {
        let mut sessions = self.lock()?;

        if !sessions.contains_key(key) && sessions.len() >= self.max_entries {
            let now = Utc::now();
            sessions.retain(|_, s| !s.is_expired(now));

            if sessions.len() >= self.max_entries {
                let oldest = sessions.iter()
                    .min_by_key(|(_, s)| s.created_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    warn!("Session store at capacity ({}), evicting oldest session", self.max_entries);
                    sessions.remove(&oldest);
                }
            }
        }

        sessions.insert(key.to_string(), record);
        Ok(())
    }

    async fn destroy(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn prune(&self) -> Result<usize, AppError> {
        let now = Utc::now();
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let removed = before - sessions.len();
        debug!(removed, remaining = sessions.len(), "Pruned session store");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_set_get_destroy() {
        let store = InMemorySessionStore::new(10);
        store.set("k1", SessionRecord::new("u1".into(), Duration::hours(1))).await.unwrap();

        let found = store.get("k1").await.unwrap().unwrap();
        assert_eq!(found.user_id, "u1");

        store.destroy("k1").await.unwrap();
        assert!(store.get("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prune_removes_only_expired() {
        let store = InMemorySessionStore::new(10);
        store.set("live", SessionRecord::new("u1".into(), Duration::hours(1))).await.unwrap();
        store.set("dead", SessionRecord::new("u2".into(), Duration::seconds(-1))).await.unwrap();

        assert_eq!(store.prune().await.unwrap(), 1);
        assert!(store.get("live").await.unwrap().is_some());
        assert!(store.get("dead").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let store = InMemorySessionStore::new(2);
        let mut first = SessionRecord::new("u1".into(), Duration::hours(1));
        first.created_at -= Duration::minutes(5);
        store.set("first", first).await.unwrap();
        store.set("second", SessionRecord::new("u2".into(), Duration::hours(1))).await.unwrap();
        store.set("third", SessionRecord::new("u3".into(), Duration::hours(1))).await.unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get("first").await.unwrap().is_none());
        assert!(store.get("third").await.unwrap().is_some());
    }
}
