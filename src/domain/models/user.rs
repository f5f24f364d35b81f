use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub instagram_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub linkedin_url: Option<String>,
    pub events_hosted: i32,
    pub events_attended: i32,
    pub friend_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, first_name: String, last_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            password_hash,
            first_name,
            last_name,
            university: None,
            graduation_year: None,
            bio: None,
            profile_image_url: None,
            instagram_handle: None,
            twitter_handle: None,
            linkedin_url: None,
            events_hosted: 0,
            events_attended: 0,
            friend_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The user as other clients see it. Never carries the password hash.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub instagram_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub linkedin_url: Option<String>,
    pub events_hosted: i32,
    pub events_attended: i32,
    pub friend_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            university: user.university,
            graduation_year: user.graduation_year,
            bio: user.bio,
            profile_image_url: user.profile_image_url,
            instagram_handle: user.instagram_handle,
            twitter_handle: user.twitter_handle,
            linkedin_url: user.linkedin_url,
            events_hosted: user.events_hosted,
            events_attended: user.events_attended,
            friend_count: user.friend_count,
            created_at: user.created_at,
        }
    }
}
