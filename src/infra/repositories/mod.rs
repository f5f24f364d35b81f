pub mod sqlite_user_repo;
pub mod sqlite_event_repo;
pub mod sqlite_rsvp_repo;
pub mod sqlite_comment_repo;
pub mod sqlite_media_repo;
pub mod sqlite_favorite_repo;
pub mod sqlite_friendship_repo;

pub mod postgres_user_repo;
pub mod postgres_event_repo;
pub mod postgres_rsvp_repo;
pub mod postgres_comment_repo;
pub mod postgres_media_repo;
pub mod postgres_favorite_repo;
pub mod postgres_friendship_repo;
