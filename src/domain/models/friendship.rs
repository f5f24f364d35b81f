use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    pub fn request(requester_id: String, addressee_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            requester_id,
            addressee_id,
            status: STATUS_PENDING.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == STATUS_ACCEPTED
    }

    pub fn other_party(&self, user_id: &str) -> &str {
        if self.requester_id == user_id { &self.addressee_id } else { &self.requester_id }
    }
}
