use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    pub event_id: Option<String>,
    pub comment_id: Option<String>,
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    #[serde(skip_serializing)]
    pub guest_email: Option<String>,
    pub media_type: String,
    pub url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Media {
    pub fn new(event_id: Option<String>, comment_id: Option<String>, media_type: String, url: String, caption: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            comment_id,
            user_id: None,
            guest_name: None,
            guest_email: None,
            media_type,
            url,
            caption,
            created_at: Utc::now(),
        }
    }
}

pub fn is_valid_media_type(media_type: &str) -> bool {
    matches!(media_type, "image" | "video")
}
