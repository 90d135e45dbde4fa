//! Integration tests for the account API
//!
//! Covers registration validation, login/logout, session-protected profile
//! access, password change (including the other-sessions logout), and
//! account deletion. Runs against an in-memory database through the full
//! router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use ballot_common::db::init::init_test_database;
use ballot_web::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: router over a fresh in-memory database
async fn setup_app() -> Router {
    let db = init_test_database().await.expect("in-memory db");
    build_router(AppState::new(db))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request_with_cookie(method: &str, uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request_with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Pull the `name=value` pair of a Set-Cookie header out of a response
fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
        .map(|v| v.split(';').next().unwrap_or(v).to_string())
}

fn valid_registration(username: &str) -> Value {
    json!({
        "username": username,
        "password": "hunter22hunter22",
        "password_confirm": "hunter22hunter22",
        "name": "Pat",
        "email": "pat@example.com",
        "birthday": "1990-04-01",
    })
}

/// Register a user and log in, returning the session cookie pair
async fn register_and_login(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/register",
            valid_registration(username),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({"username": username, "password": "hunter22hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    cookie_pair(&response, "ballot_session").expect("login should set the session cookie")
}

#[tokio::test]
async fn health_endpoint_no_auth_required() {
    let app = setup_app().await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ballot-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn register_returns_created_profile() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/account/register",
            valid_registration("pat"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["username"], "pat");
    assert_eq!(body["name"], "Pat");
    assert_eq!(body["email"], "pat@example.com");
    assert_eq!(body["birthday"], "1990-04-01");
    assert!(body["guid"].is_string());
    // Credentials never appear in responses
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_validates_fields() {
    let app = setup_app().await;

    let mut short_name = valid_registration("pat");
    short_name["name"] = json!("P");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/account/register", short_name))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut bad_email = valid_registration("pat");
    bad_email["email"] = json!("not-an-email");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/account/register", bad_email))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut mismatch = valid_registration("pat");
    mismatch["password_confirm"] = json!("different-pass");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/account/register", mismatch))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut short_password = valid_registration("pat");
    short_password["password"] = json!("short");
    short_password["password_confirm"] = json!("short");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/account/register", short_password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut bad_birthday = valid_registration("pat");
    bad_birthday["birthday"] = json!("04/01/1990");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/account/register", bad_birthday))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was created by the rejected attempts
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/account/register",
            valid_registration("pat"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/register",
            valid_registration("pat"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/account/register",
            valid_registration("pat"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("pat"));
}

#[tokio::test]
async fn login_sets_session_cookie() {
    let app = setup_app().await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/account/register",
            valid_registration("pat"),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({"username": "pat", "password": "hunter22hunter22"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = cookie_pair(&response, "ballot_session");
    assert!(cookie.is_some(), "login should set the session cookie");

    let raw_header = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(raw_header.contains("HttpOnly"));
    assert!(raw_header.contains("Max-Age=31536000"));

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["username"], "pat");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = setup_app().await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/account/register",
            valid_registration("pat"),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({"username": "pat", "password": "wrong-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({"username": "nobody", "password": "hunter22hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_requires_session() {
    let app = setup_app().await;

    let request = Request::builder()
        .uri("/api/account/profile")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A made-up token is rejected too
    let response = app
        .oneshot(request_with_cookie(
            "GET",
            "/api/account/profile",
            "ballot_session=not-a-real-token",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_roundtrip() {
    let app = setup_app().await;
    let cookie = register_and_login(&app, "pat").await;

    let response = app
        .oneshot(request_with_cookie("GET", "/api/account/profile", &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["username"], "pat");
    assert_eq!(body["name"], "Pat");
    assert_eq!(body["birthday"], "1990-04-01");
}

#[tokio::test]
async fn update_profile_changes_fields() {
    let app = setup_app().await;
    let cookie = register_and_login(&app, "pat").await;

    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            "/api/account/profile",
            &cookie,
            json!({"name": "Patricia", "email": "patricia@example.com", "birthday": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request_with_cookie("GET", "/api/account/profile", &cookie))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Patricia");
    assert_eq!(body["email"], "patricia@example.com");
    assert_eq!(body["birthday"], Value::Null);
    // Username never changes
    assert_eq!(body["username"], "pat");
}

#[tokio::test]
async fn update_profile_validates_fields() {
    let app = setup_app().await;
    let cookie = register_and_login(&app, "pat").await;

    let response = app
        .oneshot(json_request_with_cookie(
            "PUT",
            "/api/account/profile",
            &cookie,
            json!({"name": "Patricia", "email": "broken", "birthday": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_password_logs_out_other_sessions() {
    let app = setup_app().await;
    let cookie_a = register_and_login(&app, "pat").await;

    // Second login, as from another device
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({"username": "pat", "password": "hunter22hunter22"}),
        ))
        .await
        .unwrap();
    let cookie_b = cookie_pair(&response, "ballot_session").unwrap();

    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "POST",
            "/api/account/password",
            &cookie_a,
            json!({
                "current_password": "hunter22hunter22",
                "new_password": "a-brand-new-pass",
                "new_password_confirm": "a-brand-new-pass",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The changing session survives; the other one is gone
    let response = app
        .clone()
        .oneshot(request_with_cookie("GET", "/api/account/profile", &cookie_a))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request_with_cookie("GET", "/api/account/profile", &cookie_b))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Old password no longer logs in, the new one does
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({"username": "pat", "password": "hunter22hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({"username": "pat", "password": "a-brand-new-pass"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = setup_app().await;
    let cookie = register_and_login(&app, "pat").await;

    let response = app
        .oneshot(json_request_with_cookie(
            "POST",
            "/api/account/password",
            &cookie,
            json!({
                "current_password": "wrong-password",
                "new_password": "a-brand-new-pass",
                "new_password_confirm": "a-brand-new-pass",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_invalidates_session() {
    let app = setup_app().await;
    let cookie = register_and_login(&app, "pat").await;

    let response = app
        .clone()
        .oneshot(request_with_cookie("POST", "/api/account/logout", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The Set-Cookie header expires the cookie client-side
    let clearing = cookie_pair(&response, "ballot_session").unwrap();
    assert_eq!(clearing, "ballot_session=");

    let response = app
        .oneshot(request_with_cookie("GET", "/api/account/profile", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_account_removes_user_and_sessions() {
    let app = setup_app().await;
    let cookie = register_and_login(&app, "pat").await;

    let response = app
        .clone()
        .oneshot(request_with_cookie("DELETE", "/api/account", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Session died with the user
    let response = app
        .clone()
        .oneshot(request_with_cookie("GET", "/api/account/profile", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // And the credentials are gone
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({"username": "pat", "password": "hunter22hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The username can be registered again
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/account/register",
            valid_registration("pat"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}
