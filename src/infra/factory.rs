use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{
    UserRepository, EventRepository, RsvpRepository, CommentRepository, MediaRepository,
    FavoriteRepository, FriendshipRepository, EventProvider, PaymentService, ObjectStorage,
    SessionStore, RateLimiter,
};
use crate::domain::services::{auth_service::AuthService, search::EventSearchService};
use crate::infra::memory::{rate_limiter::InMemoryRateLimiter, session_store::InMemorySessionStore};
use crate::infra::payments::stripe_service::StripePaymentService;
use crate::infra::providers::ticketmaster::TicketmasterProvider;
use crate::infra::storage::signed_url_service::SignedUrlStorage;
use crate::infra::repositories::{
    postgres_user_repo::PostgresUserRepo, postgres_event_repo::PostgresEventRepo,
    postgres_rsvp_repo::PostgresRsvpRepo, postgres_comment_repo::PostgresCommentRepo,
    postgres_media_repo::PostgresMediaRepo, postgres_favorite_repo::PostgresFavoriteRepo,
    postgres_friendship_repo::PostgresFriendshipRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_event_repo::SqliteEventRepo,
    sqlite_rsvp_repo::SqliteRsvpRepo, sqlite_comment_repo::SqliteCommentRepo,
    sqlite_media_repo::SqliteMediaRepo, sqlite_favorite_repo::SqliteFavoriteRepo,
    sqlite_friendship_repo::SqliteFriendshipRepo,
};

/// Storage-backed repositories for one database backend.
pub struct Repositories {
    pub user_repo: Arc<dyn UserRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub rsvp_repo: Arc<dyn RsvpRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub media_repo: Arc<dyn MediaRepository>,
    pub favorite_repo: Arc<dyn FavoriteRepository>,
    pub friendship_repo: Arc<dyn FriendshipRepository>,
}

/// Outbound clients. Tests swap these for mocks.
pub struct Integrations {
    pub event_provider: Arc<dyn EventProvider>,
    pub payment_service: Arc<dyn PaymentService>,
    pub object_storage: Arc<dyn ObjectStorage>,
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_repositories(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_repositories(pool)
    };

    info!("Sessions and rate limits are held in process memory (single instance only)");

    let integrations = Integrations {
        event_provider: Arc::new(TicketmasterProvider::new(
            config.ticketmaster_api_key.clone(),
            config.ticketmaster_base_url.clone(),
            config.provider_page_size,
        )),
        payment_service: Arc::new(StripePaymentService::new(
            config.stripe_api_base.clone(),
            config.stripe_secret_key.clone(),
            config.platform_fee_cents,
            config.platform_fee_currency.clone(),
        )),
        object_storage: Arc::new(SignedUrlStorage::new(
            config.object_storage_signing_url.clone(),
            config.object_storage_bucket.clone(),
        )),
    };

    assemble_state(config, repos, integrations)
}

/// Wires repositories and integrations into an `AppState` with fresh in-memory
/// session and rate-limit stores.
pub fn assemble_state(config: &Config, repos: Repositories, integrations: Integrations) -> AppState {
    let session_store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(config.session_max_entries));
    let rate_limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new());

    let auth_service = Arc::new(AuthService::new(
        session_store.clone(),
        chrono::Duration::hours(config.session_ttl_hours),
    ));
    let search_service = Arc::new(EventSearchService::new(
        integrations.event_provider.clone(),
        repos.event_repo.clone(),
        repos.favorite_repo.clone(),
    ));

    AppState {
        config: config.clone(),
        user_repo: repos.user_repo,
        event_repo: repos.event_repo,
        rsvp_repo: repos.rsvp_repo,
        comment_repo: repos.comment_repo,
        media_repo: repos.media_repo,
        favorite_repo: repos.favorite_repo,
        friendship_repo: repos.friendship_repo,
        event_provider: integrations.event_provider,
        payment_service: integrations.payment_service,
        object_storage: integrations.object_storage,
        session_store,
        rate_limiter,
        auth_service,
        search_service,
    }
}

pub fn sqlite_repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
        event_repo: Arc::new(SqliteEventRepo::new(pool.clone())),
        rsvp_repo: Arc::new(SqliteRsvpRepo::new(pool.clone())),
        comment_repo: Arc::new(SqliteCommentRepo::new(pool.clone())),
        media_repo: Arc::new(SqliteMediaRepo::new(pool.clone())),
        favorite_repo: Arc::new(SqliteFavoriteRepo::new(pool.clone())),
        friendship_repo: Arc::new(SqliteFriendshipRepo::new(pool)),
    }
}

pub fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
        event_repo: Arc::new(PostgresEventRepo::new(pool.clone())),
        rsvp_repo: Arc::new(PostgresRsvpRepo::new(pool.clone())),
        comment_repo: Arc::new(PostgresCommentRepo::new(pool.clone())),
        media_repo: Arc::new(PostgresMediaRepo::new(pool.clone())),
        favorite_repo: Arc::new(PostgresFavoriteRepo::new(pool.clone())),
        friendship_repo: Arc::new(PostgresFriendshipRepo::new(pool)),
    }
}

pub async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
