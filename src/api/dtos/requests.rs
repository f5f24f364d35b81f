use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub instagram_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub linkedin_url: Option<String>,
}

/// Raw search parameters. Numbers arrive as strings so a bad value gets a
/// JSON 400 from the handler instead of a plain-text extractor rejection.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub price: f64,
    pub max_attendees: Option<i32>,
    pub is_public: Option<bool>,
    pub image_url: Option<String>,
    pub payment_intent_id: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: Option<f64>,
    pub max_attendees: Option<i32>,
    pub is_public: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct RsvpRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct GuestRsvpRequest {
    pub name: String,
    pub email: String,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCommentRequest {
    pub name: String,
    pub email: String,
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRequest {
    pub event_id: Option<String>,
    pub comment_id: Option<String>,
    pub media_type: String,
    pub url: String,
    pub caption: Option<String>,
    // Guest submissions only
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub event_id: String,
    pub external_source: String,
    pub title: String,
    pub start_date: String,
}
