use std::env;
use std::net::IpAddr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub app_env: String,
    pub ticketmaster_api_key: Option<String>,
    pub ticketmaster_base_url: String,
    pub provider_page_size: u32,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub platform_fee_cents: i64,
    pub platform_fee_currency: String,
    pub object_storage_signing_url: String,
    pub object_storage_bucket: String,
    pub session_ttl_hours: i64,
    pub session_max_entries: usize,
    pub login_max_attempts: u32,
    pub login_window_secs: u64,
    pub api_rate_limit: u32,
    pub api_rate_window_secs: u64,
    /// Peers whose `X-Forwarded-For` header is believed. Empty means none.
    pub trusted_proxies: Vec<IpAddr>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env_or("PORT", 3000),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            ticketmaster_api_key: env::var("TICKETMASTER_API_KEY").ok().filter(|k| !k.is_empty()),
            ticketmaster_base_url: env::var("TICKETMASTER_BASE_URL")
                .unwrap_or_else(|_| "https://app.ticketmaster.com/discovery/v2".to_string()),
            provider_page_size: env_or("PROVIDER_PAGE_SIZE", 50),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok().filter(|k| !k.is_empty()),
            stripe_api_base: env::var("STRIPE_API_BASE").unwrap_or_else(|_| "https://api.stripe.com/v1".to_string()),
            platform_fee_cents: env_or("PLATFORM_FEE_CENTS", 500),
            platform_fee_currency: env::var("PLATFORM_FEE_CURRENCY").unwrap_or_else(|_| "usd".to_string()),
            object_storage_signing_url: env::var("OBJECT_STORAGE_SIGNING_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:1106/object-storage/signed-object-url".to_string()),
            object_storage_bucket: env::var("OBJECT_STORAGE_BUCKET").unwrap_or_else(|_| "campus-events-uploads".to_string()),
            session_ttl_hours: env_or("SESSION_TTL_HOURS", 24 * 7),
            session_max_entries: env_or("SESSION_MAX_ENTRIES", 10_000),
            login_max_attempts: env_or("LOGIN_MAX_ATTEMPTS", 5),
            login_window_secs: env_or("LOGIN_WINDOW_SECS", 15 * 60),
            api_rate_limit: env_or("API_RATE_LIMIT", 1000),
            api_rate_window_secs: env_or("API_RATE_WINDOW_SECS", 15 * 60),
            trusted_proxies: env::var("TRUSTED_PROXIES")
                .map(|raw| parse_ip_list(&raw))
                .unwrap_or_default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(val) => val.parse().unwrap_or_else(|_| panic!("{} must be a valid number", key)),
        Err(_) => default,
    }
}

fn parse_ip_list(raw: &str) -> Vec<IpAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.parse().unwrap_or_else(|_| panic!("TRUSTED_PROXIES entry {} is not an IP address", entry)))
        .collect()
}
