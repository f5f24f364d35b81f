use crate::domain::models::{
    user::User, event::{Event, LocationQuery, SearchEvent, EventCategory}, rsvp::Rsvp,
    comment::Comment, media::Media, favorite::Favorite, friendship::Friendship,
    session::SessionRecord, payment::{PaymentIntent, UploadTarget},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_many(&self, ids: &[String]) -> Result<Vec<User>, AppError>;
    async fn update_profile(&self, user: &User) -> Result<User, AppError>;
    async fn adjust_counters(&self, id: &str, hosted: i32, attended: i32, friends: i32) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn find_by_payment_intent(&self, intent_id: &str) -> Result<Option<Event>, AppError>;
    async fn search_by_location(&self, query: &LocationQuery) -> Result<Vec<Event>, AppError>;
    async fn list_by_host(&self, host_id: &str) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait RsvpRepository: Send + Sync {
    /// Insert or replace the status of the (event, user) RSVP in one transaction
    /// that also enforces `capacity` for a new attendee and moves the user's
    /// `events_attended` counter by the status transition.
    async fn upsert_for_user(&self, rsvp: &Rsvp, capacity: Option<i32>) -> Result<Rsvp, AppError>;
    async fn create_guest(&self, rsvp: &Rsvp, capacity: Option<i32>) -> Result<Rsvp, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Rsvp>, AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Comment>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Comment>, AppError>;
}

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn create(&self, media: &Media) -> Result<Media, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Media>, AppError>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Idempotent: returns the existing row if the key is already present.
    async fn add(&self, favorite: &Favorite) -> Result<Favorite, AppError>;
    async fn remove(&self, user_id: &str, external_source: &str, event_id: &str) -> Result<(), AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Favorite>, AppError>;
}

#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    async fn create(&self, friendship: &Friendship) -> Result<Friendship, AppError>;
    /// Looks in both directions.
    async fn find_between(&self, a: &str, b: &str) -> Result<Option<Friendship>, AppError>;
    async fn accept(&self, id: &str) -> Result<Friendship, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn list_accepted(&self, user_id: &str) -> Result<Vec<Friendship>, AppError>;
    async fn list_incoming(&self, user_id: &str) -> Result<Vec<Friendship>, AppError>;
}

#[derive(Debug, Clone)]
pub struct ProviderQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_miles: f64,
    pub category: Option<EventCategory>,
    pub keyword: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait EventProvider: Send + Sync {
    fn source_name(&self) -> &'static str;
    async fn search(&self, query: &ProviderQuery) -> Result<Vec<SearchEvent>, AppError>;
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_platform_fee_intent(&self, user_id: &str) -> Result<PaymentIntent, AppError>;
    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, AppError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn signed_upload_url(&self) -> Result<UploadTarget, AppError>;
}

/// Key-value session storage with expiry. Keys are digests, never raw cookie values.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<SessionRecord>, AppError>;
    async fn set(&self, key: &str, record: SessionRecord) -> Result<(), AppError>;
    async fn destroy(&self, key: &str) -> Result<(), AppError>;
    /// Drops expired entries and returns how many were removed.
    async fn prune(&self) -> Result<usize, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after_secs: u64,
}

/// Fixed-window attempt counter.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check_and_record(&self, key: &str, max_attempts: u32, window: Duration) -> Result<RateDecision, AppError>;
    async fn reset(&self, key: &str) -> Result<(), AppError>;
    async fn prune(&self) -> Result<usize, AppError>;
}
