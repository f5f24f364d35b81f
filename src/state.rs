use std::sync::Arc;
use crate::domain::ports::{
    UserRepository, EventRepository, RsvpRepository, CommentRepository, MediaRepository,
    FavoriteRepository, FriendshipRepository, EventProvider, PaymentService, ObjectStorage,
    SessionStore, RateLimiter,
};
use crate::domain::services::{auth_service::AuthService, search::EventSearchService};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub rsvp_repo: Arc<dyn RsvpRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub media_repo: Arc<dyn MediaRepository>,
    pub favorite_repo: Arc<dyn FavoriteRepository>,
    pub friendship_repo: Arc<dyn FriendshipRepository>,
    pub event_provider: Arc<dyn EventProvider>,
    pub payment_service: Arc<dyn PaymentService>,
    pub object_storage: Arc<dyn ObjectStorage>,
    pub session_store: Arc<dyn SessionStore>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub auth_service: Arc<AuthService>,
    pub search_service: Arc<EventSearchService>,
}
