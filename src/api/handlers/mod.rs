pub mod auth;
pub mod comment;
pub mod event;
pub mod favorite;
pub mod friend;
pub mod health;
pub mod media;
pub mod payment;
pub mod rsvp;
pub mod upload;
pub mod user;
