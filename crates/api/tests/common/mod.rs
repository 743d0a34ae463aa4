//! Shared helpers for HTTP integration tests.
//!
//! Each test drives the full router against its own in-memory SQLite
//! database through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use gophermart_api::{AppState, create_router};
use gophermart_db::migration::{Migrator, MigratorTrait};
use gophermart_db::{LedgerRepository, UserRepository};
use gophermart_shared::JwtService;
use gophermart_shared::config::{DatabaseConfig, JwtConfig};
use gophermart_shared::types::{Amount, UserId};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

/// Router plus a handle on its database for seeding and assertions.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

/// Buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("Response body is not UTF-8")
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            run_migrations: true,
        };
        let db = gophermart_db::connect(&config)
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let jwt_service = JwtService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry_hours: 1,
        });
        let state = AppState {
            db: Arc::new(db.clone()),
            jwt_service: Arc::new(jwt_service),
        };

        Self {
            router: create_router(state),
            db,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &str) -> TestResponse {
        self.send(request(Method::POST, uri, token, "application/json", body))
            .await
    }

    pub async fn post_text(&self, uri: &str, token: &str, body: &str) -> TestResponse {
        self.send(request(Method::POST, uri, Some(token), "text/plain", body))
            .await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, "text/plain", ""))
            .await
    }

    /// Registers `login` and returns the session token from the body.
    pub async fn register(&self, login: &str) -> String {
        let body = format!(r#"{{"login":"{login}","password":"secret-{login}"}}"#);
        let response = self.post_json("/api/user/register", None, &body).await;
        assert_eq!(response.status, StatusCode::OK);
        response.text()
    }

    pub async fn user_id(&self, login: &str) -> UserId {
        let user = UserRepository::new(self.db.clone())
            .find_by_login(login)
            .await
            .expect("Lookup failed")
            .expect("User missing");
        UserId::from_uuid(user.id)
    }

    /// Credits `minor` points straight through the ledger.
    pub async fn fund(&self, login: &str, minor: i64) {
        let user_id = self.user_id(login).await;
        LedgerRepository::credit(&self.db, user_id, Amount::from_minor(minor))
            .await
            .expect("Failed to credit user");
    }
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    content_type: &str,
    body: &str,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}
