//! Registration, login and token handling over HTTP.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::TestApp;
use rstest::rstest;

#[tokio::test]
async fn test_register_hands_out_token_three_ways() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/user/register",
            None,
            r#"{"login":"alice","password":"wonderland"}"#,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.text();
    assert!(!token.is_empty());
    assert_eq!(
        response.headers[header::AUTHORIZATION],
        format!("Bearer {token}").as_str()
    );
    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(&format!("Authorization={token}")));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_duplicate_login_conflicts() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let response = app
        .post_json(
            "/api/user/register",
            None,
            r#"{"login":"alice","password":"other"}"#,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["error"], "CONFLICT");
}

#[rstest]
#[case::not_json("login=alice")]
#[case::missing_field(r#"{"login":"alice"}"#)]
#[case::empty_login(r#"{"login":"","password":"x"}"#)]
#[case::empty_password(r#"{"login":"alice","password":""}"#)]
#[tokio::test]
async fn test_malformed_credentials_are_rejected(#[case] body: &str) {
    let app = TestApp::new().await;

    let register = app.post_json("/api/user/register", None, body).await;
    let login = app.post_json("/api/user/login", None, body).await;

    assert_eq!(register.status, StatusCode::BAD_REQUEST);
    assert_eq!(login.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_correct_password() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let response = app
        .post_json(
            "/api/user/login",
            None,
            r#"{"login":"alice","password":"secret-alice"}"#,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.text();
    let orders = app.get("/api/user/orders", Some(&token)).await;
    assert_eq!(orders.status, StatusCode::NO_CONTENT);
}

#[rstest]
#[case::wrong_password(r#"{"login":"alice","password":"nope"}"#)]
#[case::unknown_user(r#"{"login":"bob","password":"secret-bob"}"#)]
#[tokio::test]
async fn test_bad_credentials_are_unauthorized(#[case] body: &str) {
    let app = TestApp::new().await;
    app.register("alice").await;

    let response = app.post_json("/api/user/login", None, body).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;

    let missing = app.get("/api/user/balance", None).await;
    let garbage = app.get("/api/user/balance", Some("not-a-jwt")).await;

    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.json()["error"], "missing_token");
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.json()["error"], "invalid_token");
}

#[tokio::test]
async fn test_cookie_authenticates_without_header() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/user/balance")
        .header(header::COOKIE, format!("Authorization={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_ping_reports_database_up() {
    let app = TestApp::new().await;

    let response = app.get("/ping", None).await;

    assert_eq!(response.status, StatusCode::OK);
}
