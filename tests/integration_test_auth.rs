mod common;

use axum::http::StatusCode;
use common::{TestApp, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_register_sets_session_and_hides_hash() {
    let app = TestApp::new().await;

    let res = app.request("POST", "/api/register", Some(json!({
        "email": "  Sam@UC.edu ",
        "password": TEST_PASSWORD,
        "firstName": "Sam",
        "lastName": "Bearcat",
        "university": "University of Cincinnati",
    })), None).await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["email"], "sam@uc.edu");
    assert_eq!(res.body["firstName"], "Sam");
    assert!(res.body.get("passwordHash").is_none());
    assert!(res.body.get("password_hash").is_none());
    let cookie = res.session_cookie.expect("session cookie");

    let me = app.request("GET", "/api/user", None, Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "sam@uc.edu");
    assert_eq!(me.body["university"], "University of Cincinnati");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict_without_new_row() {
    let app = TestApp::new().await;
    app.register("dup@uc.edu").await;

    let res = app.request("POST", "/api/register", Some(json!({
        "email": "DUP@uc.edu",
        "password": TEST_PASSWORD,
        "firstName": "Again",
        "lastName": "Person",
    })), None).await;

    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(res.session_cookie.is_none());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind("dup@uc.edu")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_registration_validation() {
    let app = TestApp::new().await;

    let cases = [
        json!({"email": "not-an-email", "password": TEST_PASSWORD, "firstName": "A", "lastName": "B"}),
        json!({"email": "a@uc.edu", "password": "short1A", "firstName": "A", "lastName": "B"}),
        json!({"email": "a@uc.edu", "password": "alllowercase1", "firstName": "A", "lastName": "B"}),
        json!({"email": "a@uc.edu", "password": TEST_PASSWORD, "firstName": "  ", "lastName": "B"}),
    ];
    for body in cases {
        let res = app.request("POST", "/api/register", Some(body.clone()), None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body {}", body);
    }
}

#[tokio::test]
async fn test_bad_password_and_unknown_email_look_identical() {
    let app = TestApp::new().await;
    app.register("real@uc.edu").await;

    let wrong_password = app.request("POST", "/api/login", Some(json!({
        "email": "real@uc.edu", "password": "Wr0ngPassword"
    })), None).await;
    let unknown_email = app.request("POST", "/api/login", Some(json!({
        "email": "ghost@uc.edu", "password": TEST_PASSWORD
    })), None).await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let app = TestApp::new().await;
    app.register("mixed@uc.edu").await;

    let res = app.request("POST", "/api/login", Some(json!({
        "email": "MIXED@UC.EDU", "password": TEST_PASSWORD
    })), None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.session_cookie.is_some());
}

#[tokio::test]
async fn test_login_rate_limited_after_five_attempts() {
    let app = TestApp::new().await;
    app.register("target@uc.edu").await;

    for attempt in 1..=5 {
        let res = app.request("POST", "/api/login", Some(json!({
            "email": "target@uc.edu", "password": "Wr0ngPassword"
        })), None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "attempt {}", attempt);
    }

    // Correct password no longer helps inside the window
    let res = app.request("POST", "/api/login", Some(json!({
        "email": "target@uc.edu", "password": TEST_PASSWORD
    })), None).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    // Another client address has its own budget
    let res = app.request_from("POST", "/api/login", Some(json!({
        "email": "target@uc.edu", "password": TEST_PASSWORD
    })), None, "203.0.113.50").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_login_limit() {
    let app = TestApp::new().await;
    app.register("spoof@uc.edu").await;
    let bad = json!({"email": "spoof@uc.edu", "password": "Wr0ngPassword"});

    for attempt in 1..=5 {
        let forged = format!("203.0.113.{}", attempt);
        let res = app.request_with_forwarded("POST", "/api/login", Some(bad.clone()), None, "198.51.100.1", Some(&forged)).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "attempt {}", attempt);
    }

    let res = app.request_with_forwarded("POST", "/api/login", Some(json!({
        "email": "spoof@uc.edu", "password": TEST_PASSWORD
    })), None, "198.51.100.1", Some("203.0.113.200")).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_for_is_honored_behind_trusted_proxy() {
    let app = TestApp::with_config(|c| c.trusted_proxies = vec!["10.0.0.1".parse().unwrap()]).await;
    app.register("proxied@uc.edu").await;
    let bad = json!({"email": "proxied@uc.edu", "password": "Wr0ngPassword"});

    for _ in 0..5 {
        let res = app.request_with_forwarded("POST", "/api/login", Some(bad.clone()), None, "10.0.0.1", Some("203.0.113.9")).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }
    let res = app.request_with_forwarded("POST", "/api/login", Some(bad.clone()), None, "10.0.0.1", Some("203.0.113.9")).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    // A different client behind the same proxy keeps its own budget
    let res = app.request_with_forwarded("POST", "/api/login", Some(json!({
        "email": "proxied@uc.edu", "password": TEST_PASSWORD
    })), None, "10.0.0.1", Some("203.0.113.10")).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_successful_login_resets_attempt_counter() {
    let app = TestApp::new().await;
    app.register("reset@uc.edu").await;
    let bad = json!({"email": "reset@uc.edu", "password": "Wr0ngPassword"});
    let good = json!({"email": "reset@uc.edu", "password": TEST_PASSWORD});

    for _ in 0..4 {
        app.request("POST", "/api/login", Some(bad.clone()), None).await;
    }
    assert_eq!(app.request("POST", "/api/login", Some(good.clone()), None).await.status, StatusCode::OK);

    for _ in 0..4 {
        let res = app.request("POST", "/api/login", Some(bad.clone()), None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(app.request("POST", "/api/login", Some(good), None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let app = TestApp::new().await;
    let (_, cookie) = app.register("bye@uc.edu").await;

    assert_eq!(app.request("GET", "/api/user", None, Some(&cookie)).await.status, StatusCode::OK);

    let res = app.request("POST", "/api/logout", None, Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.request("GET", "/api/user", None, Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // Logging out twice is harmless
    let res = app.request("POST", "/api/logout", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_session_cookie_is_unauthorized() {
    let app = TestApp::new().await;
    let res = app.request("GET", "/api/user", None, Some("sid=forged-session-id")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.request("GET", "/api/user", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_and_public_profile() {
    let app = TestApp::new().await;
    let (user_id, cookie) = app.register("profile@uc.edu").await;

    let res = app.request("PUT", "/api/user", Some(json!({
        "bio": "CS '27, always at trivia",
        "instagramHandle": "bearcat_sam",
        "graduationYear": 2027,
    })), Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["bio"], "CS '27, always at trivia");

    let res = app.request("PUT", "/api/user", Some(json!({"firstName": ""})), Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let public = app.request("GET", &format!("/api/users/{}", user_id), None, None).await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(public.body["instagramHandle"], "bearcat_sam");
    assert_eq!(public.body["graduationYear"], 2027);

    let missing = app.request("GET", "/api/users/nope", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
