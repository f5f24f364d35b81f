pub mod auth_service;
pub mod geo;
pub mod password;
pub mod search;
