#![allow(dead_code)]

use campus_events::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::event::{EventCategory, EventSource, SearchEvent},
    domain::models::payment::{PaymentIntent, UploadTarget},
    domain::ports::{EventProvider, ObjectStorage, PaymentService, ProviderQuery},
    infra::factory::{assemble_state, sqlite_repositories, Integrations},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;
use axum::{
    extract::ConnectInfo,
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use std::str::FromStr;
use std::net::SocketAddr;
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::{json, Value};

pub const TEST_PASSWORD: &str = "Passw0rdOk";

#[derive(Default)]
pub struct MockProvider {
    pub events: Mutex<Vec<SearchEvent>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl MockProvider {
    pub fn set_events(&self, events: Vec<SearchEvent>) {
        *self.events.lock().unwrap() = events;
    }
}

#[async_trait]
impl EventProvider for MockProvider {
    fn source_name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, _query: &ProviderQuery) -> Result<Vec<SearchEvent>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::ExternalService("mock provider down".into()));
        }
        Ok(self.events.lock().unwrap().clone())
    }
}

/// `pi_paid_{user_id}` is a settled platform fee for that user and
/// `pi_short_{user_id}` a settled but underpaid one. Anything else is pending.
pub struct MockPaymentService;

#[async_trait]
impl PaymentService for MockPaymentService {
    async fn create_platform_fee_intent(&self, user_id: &str) -> Result<PaymentIntent, AppError> {
        Ok(PaymentIntent {
            id: format!("pi_test_{}", Uuid::new_v4().simple()),
            client_secret: "pi_test_secret_abc".to_string(),
            amount: 500,
            currency: "usd".to_string(),
            status: "requires_payment_method".to_string(),
            user_id: Some(user_id.to_string()),
        })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, AppError> {
        let (status, amount, user_id) = if let Some(user) = intent_id.strip_prefix("pi_paid_") {
            ("succeeded", 500, Some(user.to_string()))
        } else if let Some(user) = intent_id.strip_prefix("pi_short_") {
            ("succeeded", 100, Some(user.to_string()))
        } else {
            ("requires_payment_method", 500, None)
        };
        Ok(PaymentIntent {
            id: intent_id.to_string(),
            client_secret: "pi_test_secret_abc".to_string(),
            amount,
            currency: "usd".to_string(),
            status: status.to_string(),
            user_id,
        })
    }
}

pub struct MockObjectStorage;

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn signed_upload_url(&self) -> Result<UploadTarget, AppError> {
        let id = Uuid::new_v4();
        Ok(UploadTarget {
            upload_url: format!("https://storage.test/uploads/{}?sig=abc", id),
            object_path: format!("/objects/uploads/{}", id),
        })
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub session_cookie: Option<String>,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub provider: Arc<MockProvider>,
}

pub fn test_config(db_url: &str) -> Config {
    Config {
        database_url: db_url.to_string(),
        port: 0,
        app_env: "test".to_string(),
        ticketmaster_api_key: None,
        ticketmaster_base_url: "http://localhost".to_string(),
        provider_page_size: 50,
        stripe_secret_key: None,
        stripe_api_base: "http://localhost".to_string(),
        platform_fee_cents: 500,
        platform_fee_currency: "usd".to_string(),
        object_storage_signing_url: "http://localhost".to_string(),
        object_storage_bucket: "test-bucket".to_string(),
        session_ttl_hours: 1,
        session_max_entries: 1000,
        login_max_attempts: 5,
        login_window_secs: 900,
        api_rate_limit: 1000,
        api_rate_window_secs: 900,
        trusted_proxies: Vec::new(),
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut config = test_config(&db_url);
        customize(&mut config);

        let provider = Arc::new(MockProvider::default());
        let integrations = Integrations {
            event_provider: provider.clone(),
            payment_service: Arc::new(MockPaymentService),
            object_storage: Arc::new(MockObjectStorage),
        };

        let state = Arc::new(assemble_state(&config, sqlite_repositories(pool.clone()), integrations));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            provider,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> TestResponse {
        self.request_from(method, uri, body, cookie, "198.51.100.1").await
    }

    /// Sends a request whose socket peer is `ip`.
    pub async fn request_from(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
        ip: &str,
    ) -> TestResponse {
        self.request_with_forwarded(method, uri, body, cookie, ip, None).await
    }

    /// Like `request_from`, optionally adding an `X-Forwarded-For` header.
    pub async fn request_with_forwarded(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
        peer_ip: &str,
        forwarded_for: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri);
        if let Some(forwarded_for) = forwarded_for {
            builder = builder.header("X-Forwarded-For", forwarded_for);
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let mut request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let peer = SocketAddr::new(peer_ip.parse().expect("test peer must be an IP"), 40_000);
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let session_cookie = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .find(|c| c.starts_with("sid=") && !c.starts_with("sid=;"))
            .and_then(|c| c.split(';').next())
            .map(str::to_string);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, session_cookie }
    }

    /// Registers a user and returns (user id, `sid=...` cookie).
    pub async fn register(&self, email: &str) -> (String, String) {
        let res = self.request("POST", "/api/register", Some(json!({
            "email": email,
            "password": TEST_PASSWORD,
            "firstName": "Test",
            "lastName": "User",
        })), None).await;

        if res.status != StatusCode::CREATED {
            panic!("Registration failed in test helper: status {} body {}", res.status, res.body);
        }

        let id = res.body["id"].as_str().expect("No id in body").to_string();
        (id, res.session_cookie.expect("No session cookie returned"))
    }

    /// Creates a stored event hosted by the cookie's user and returns its id.
    pub async fn create_event(&self, cookie: &str, payload: Value) -> String {
        let res = self.request("POST", "/api/events", Some(payload), Some(cookie)).await;
        if res.status != StatusCode::CREATED {
            panic!("Event creation failed in test helper: status {} body {}", res.status, res.body);
        }
        res.body["id"].as_str().unwrap().to_string()
    }
}

pub fn event_payload(title: &str, hours_from_now: i64, lat: Option<f64>, lng: Option<f64>) -> Value {
    json!({
        "title": title,
        "description": format!("{} description", title),
        "category": "social",
        "startDate": (chrono::Utc::now() + chrono::Duration::hours(hours_from_now)).to_rfc3339(),
        "location": "Tangeman University Center",
        "latitude": lat,
        "longitude": lng,
        "price": 0.0,
    })
}

pub fn provider_event(id: &str, start: String) -> SearchEvent {
    SearchEvent {
        id: id.to_string(),
        title: format!("Provider {}", id),
        description: String::new(),
        category: EventCategory::Concerts,
        start_date: start,
        end_date: None,
        location: "Heritage Bank Center, Cincinnati".to_string(),
        latitude: Some(39.0961),
        longitude: Some(-84.5116),
        host_id: None,
        price: 35.0,
        min_price: 35.0,
        max_price: 120.0,
        max_attendees: None,
        image_url: None,
        ticket_url: Some(format!("https://tickets.test/{}", id)),
        external_id: Some(id.to_string()),
        external_source: EventSource::Ticketmaster,
        is_favorited: false,
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
