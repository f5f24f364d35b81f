pub mod user;
pub mod event;
pub mod rsvp;
pub mod comment;
pub mod media;
pub mod favorite;
pub mod friendship;
pub mod session;
pub mod payment;
