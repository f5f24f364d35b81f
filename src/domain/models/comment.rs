use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub event_id: String,
    pub parent_id: Option<String>,
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    #[serde(skip_serializing)]
    pub guest_email: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(event_id: String, parent_id: Option<String>, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            parent_id,
            user_id: None,
            guest_name: None,
            guest_email: None,
            content,
            created_at: Utc::now(),
        }
    }
}
