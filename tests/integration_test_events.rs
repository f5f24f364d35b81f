mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{event_payload, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_create_event_requires_session() {
    let app = TestApp::new().await;
    let res = app.request("POST", "/api/events", Some(event_payload("Anon", 24, None, None)), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_fetch_event() {
    let app = TestApp::new().await;
    let (user_id, cookie) = app.register("host@uc.edu").await;

    let event_id = app.create_event(&cookie, event_payload("Rooftop Mixer", 24, Some(39.13), Some(-84.51))).await;

    let res = app.request("GET", &format!("/api/events/{}", event_id), None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], "Rooftop Mixer");
    assert_eq!(res.body["externalSource"], "user");
    assert_eq!(res.body["hostId"], user_id.as_str());
    assert_eq!(res.body["isPublic"], true);

    let me = app.request("GET", "/api/user", None, Some(&cookie)).await;
    assert_eq!(me.body["eventsHosted"], 1);

    let hosted = app.request("GET", &format!("/api/users/{}/events", user_id), None, None).await;
    assert_eq!(hosted.body.as_array().unwrap().len(), 1);

    let missing = app.request("GET", "/api/events/does-not-exist", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_event_validation() {
    let app = TestApp::new().await;
    let (_, cookie) = app.register("host@uc.edu").await;

    let past = event_payload("Yesterday", -24, None, None);
    let mut bad_category = event_payload("Odd", 24, None, None);
    bad_category["category"] = "theatre".into();
    let mut half_coords = event_payload("Half", 24, Some(39.1), None);
    half_coords["longitude"] = serde_json::Value::Null;
    let mut blank_title = event_payload("x", 24, None, None);
    blank_title["title"] = "   ".into();

    for body in [past, bad_category, half_coords, blank_title] {
        let res = app.request("POST", "/api/events", Some(body.clone()), Some(&cookie)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body {}", body);
    }
}

#[tokio::test]
async fn test_only_host_can_update_or_delete() {
    let app = TestApp::new().await;
    let (_, host) = app.register("host@uc.edu").await;
    let (_, other) = app.register("other@uc.edu").await;
    let event_id = app.create_event(&host, event_payload("Pickup Hoops", 24, None, None)).await;
    let uri = format!("/api/events/{}", event_id);

    let res = app.request("PUT", &uri, Some(json!({"title": "Hijacked"})), Some(&other)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.request("DELETE", &uri, None, Some(&other)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.request("PUT", &uri, Some(json!({"title": "Pickup Hoops (moved)", "maxAttendees": 10})), Some(&host)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], "Pickup Hoops (moved)");
    assert_eq!(res.body["maxAttendees"], 10);

    let res = app.request("DELETE", &uri, None, Some(&host)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(app.request("GET", &uri, None, None).await.status, StatusCode::NOT_FOUND);

    let me = app.request("GET", "/api/user", None, Some(&host)).await;
    assert_eq!(me.body["eventsHosted"], 0);
}

#[tokio::test]
async fn test_platform_fee_payment_intent() {
    let app = TestApp::new().await;
    let (_, cookie) = app.register("payer@uc.edu").await;

    let res = app.request("POST", "/api/create-event-payment", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.request("POST", "/api/create-event-payment", None, Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["clientSecret"], "pi_test_secret_abc");
    assert_eq!(res.body["amount"], 500);
}

#[tokio::test]
async fn test_unpaid_intent_blocks_event_when_payments_enabled() {
    let app = TestApp::with_config(|c| c.stripe_secret_key = Some("sk_test_dummy".into())).await;
    let (host_id, cookie) = app.register("host@uc.edu").await;

    let mut unpaid = event_payload("Unpaid", 24, None, None);
    unpaid["paymentIntentId"] = "pi_test_pending".into();
    let res = app.request("POST", "/api/events", Some(unpaid), Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let mut paid = event_payload("Paid", 24, None, None);
    paid["paymentIntentId"] = format!("pi_paid_{}", host_id).into();
    let res = app.request("POST", "/api/events", Some(paid), Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert!(res.body.get("paymentIntentId").is_none());
}

#[tokio::test]
async fn test_missing_intent_is_rejected_when_payments_enabled() {
    let app = TestApp::with_config(|c| c.stripe_secret_key = Some("sk_test_dummy".into())).await;
    let (_, cookie) = app.register("freeloader@uc.edu").await;

    let res = app.request("POST", "/api/events", Some(event_payload("Free ride", 24, None, None)), Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events").fetch_one(&app.pool).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_paid_intent_cannot_be_reused_or_borrowed() {
    let app = TestApp::with_config(|c| c.stripe_secret_key = Some("sk_test_dummy".into())).await;
    let (host_id, cookie) = app.register("host@uc.edu").await;
    let (_, other_cookie) = app.register("other@uc.edu").await;
    let intent = format!("pi_paid_{}", host_id);

    let mut first = event_payload("First", 24, None, None);
    first["paymentIntentId"] = intent.clone().into();
    assert_eq!(app.request("POST", "/api/events", Some(first), Some(&cookie)).await.status, StatusCode::CREATED);

    let mut again = event_payload("Second", 48, None, None);
    again["paymentIntentId"] = intent.clone().into();
    assert_eq!(app.request("POST", "/api/events", Some(again), Some(&cookie)).await.status, StatusCode::CONFLICT);

    let mut borrowed = event_payload("Borrowed", 48, None, None);
    borrowed["paymentIntentId"] = intent.into();
    let res = app.request("POST", "/api/events", Some(borrowed), Some(&other_cookie)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_intent_must_match_fee_and_payer() {
    let app = TestApp::with_config(|c| c.stripe_secret_key = Some("sk_test_dummy".into())).await;
    let (host_id, cookie) = app.register("host@uc.edu").await;
    let (other_id, _) = app.register("other@uc.edu").await;

    let mut underpaid = event_payload("Underpaid", 24, None, None);
    underpaid["paymentIntentId"] = format!("pi_short_{}", host_id).into();
    assert_eq!(app.request("POST", "/api/events", Some(underpaid), Some(&cookie)).await.status, StatusCode::BAD_REQUEST);

    let mut someone_elses = event_payload("Someone else's", 24, None, None);
    someone_elses["paymentIntentId"] = format!("pi_paid_{}", other_id).into();
    assert_eq!(app.request("POST", "/api/events", Some(someone_elses), Some(&cookie)).await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_url_is_signed() {
    let app = TestApp::new().await;
    let res = app.request("POST", "/api/objects/upload", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["uploadURL"].as_str().unwrap().starts_with("https://storage.test/"));
    assert!(res.body["objectPath"].as_str().unwrap().starts_with("/objects/uploads/"));
}

#[tokio::test]
async fn test_health_is_exempt_from_api_rate_limit() {
    let app = TestApp::with_config(|c| c.api_rate_limit = 3).await;

    for _ in 0..3 {
        let res = app.request("GET", "/api/events/search?lat=39.1&lng=-84.5", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
    }
    let res = app.request("GET", "/api/events/search?lat=39.1&lng=-84.5", None, None).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    for _ in 0..10 {
        let res = app.request("GET", "/api/health", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["status"], "ok");
    }

    // Limits are per client address
    let res = app.request_from("GET", "/api/events/search?lat=39.1&lng=-84.5", None, None, "192.0.2.99").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_background_sweep_drops_expired_sessions() {
    let app = TestApp::new().await;
    let (user_id, _) = app.register("sweep@uc.edu").await;

    let expired = campus_events::domain::models::session::SessionRecord {
        user_id,
        created_at: Utc::now() - Duration::hours(3),
        expires_at: Utc::now() - Duration::hours(1),
    };
    app.state.session_store.set("stale-key", expired).await.unwrap();

    campus_events::background::sweep_once(&app.state).await;

    assert!(app.state.session_store.get("stale-key").await.unwrap().is_none());
}
