use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Keyed by (user_id, event_id, external_source): provider ids and stored
/// event ids live in different namespaces and may collide.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub external_source: String,
    pub title: String,
    pub start_date: String,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn new(user_id: String, event_id: String, external_source: String, title: String, start_date: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            event_id,
            external_source,
            title,
            start_date,
            created_at: Utc::now(),
        }
    }
}
