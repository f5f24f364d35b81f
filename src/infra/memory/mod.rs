pub mod session_store;
pub mod rate_limiter;
