use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Attending,
    Maybe,
    NotAttending,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Attending => "attending",
            RsvpStatus::Maybe => "maybe",
            RsvpStatus::NotAttending => "not_attending",
        }
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attending" => Ok(RsvpStatus::Attending),
            "maybe" => Ok(RsvpStatus::Maybe),
            "not_attending" => Ok(RsvpStatus::NotAttending),
            other => Err(format!("Invalid RSVP status '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    pub id: String,
    pub event_id: String,
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    #[serde(skip_serializing)]
    pub guest_email: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rsvp {
    pub fn for_user(event_id: String, user_id: String, status: RsvpStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            user_id: Some(user_id),
            guest_name: None,
            guest_email: None,
            status: status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn for_guest(event_id: String, name: String, email: String, status: RsvpStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            user_id: None,
            guest_name: Some(name),
            guest_email: Some(email),
            status: status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_attending(&self) -> bool {
        self.status == RsvpStatus::Attending.as_str()
    }
}

/// Change to a user's attended counter when their RSVP moves from `previous` to `next`.
pub fn attended_delta(previous: Option<&str>, next: &str) -> i32 {
    let attending = RsvpStatus::Attending.as_str();
    match (previous == Some(attending), next == attending) {
        (false, true) => 1,
        (true, false) => -1,
        _ => 0,
    }
}
