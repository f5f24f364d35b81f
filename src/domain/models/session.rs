use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(user_id: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
