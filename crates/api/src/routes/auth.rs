//! Registration and login routes.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use tracing::{error, info};

use super::parse_json;
use crate::{AppState, error::ApiError, middleware::AUTH_COOKIE};
use gophermart_core::auth::{hash_password, verify_password};
use gophermart_db::{UserError, UserRepository};
use gophermart_shared::AppError;
use gophermart_shared::types::UserId;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/register", post(register))
        .route("/api/user/login", post(login))
}

/// Login and registration payload.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// User login.
    pub login: String,
    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    fn parse(body: &Bytes) -> Result<Self, ApiError> {
        let credentials: Self = parse_json(body)?;
        if credentials.login.trim().is_empty() || credentials.password.is_empty() {
            return Err(ApiError::bad_request("Login and password are required"));
        }
        Ok(credentials)
    }
}

/// POST /api/user/register - Create an account and start a session.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, ApiError> {
    let credentials = Credentials::parse(&body)?;

    let password_hash = hash_password(&credentials.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::internal("An error occurred during registration")
    })?;

    let user_repo = UserRepository::new((*state.db).clone());
    let user = user_repo
        .create(&credentials.login, &password_hash)
        .await
        .map_err(|e| match e {
            UserError::LoginTaken(login) => {
                ApiError(AppError::Conflict(format!("Login {login} is already taken")))
            }
            UserError::Database(e) => ApiError(AppError::Database(e.to_string())),
        })?;

    info!(user_id = %user.id, "User registered");

    issue_session(&state, jar, UserId::from_uuid(user.id))
}

/// POST /api/user/login - Authenticate and start a session.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, ApiError> {
    let credentials = Credentials::parse(&body)?;

    let user_repo = UserRepository::new((*state.db).clone());
    let Some(user) = user_repo
        .find_by_login(&credentials.login)
        .await
        .map_err(|e| ApiError(AppError::Database(e.to_string())))?
    else {
        info!(login = %credentials.login, "Login attempt for non-existent user");
        return Err(ApiError::unauthorized("Invalid login or password"));
    };

    let verified = verify_password(&credentials.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "Password verification error");
        ApiError::internal("An error occurred during login")
    })?;
    if !verified {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(ApiError::unauthorized("Invalid login or password"));
    }

    info!(user_id = %user.id, "User logged in");

    issue_session(&state, jar, UserId::from_uuid(user.id))
}

/// Hands the token out three ways: bearer header, HttpOnly cookie and body.
fn issue_session(state: &AppState, jar: CookieJar, user_id: UserId) -> Result<Response, ApiError> {
    let token = state.jwt_service.generate_token(user_id).map_err(|e| {
        error!(error = %e, "Failed to generate token");
        ApiError::internal("Failed to issue session token")
    })?;

    let cookie = Cookie::build((AUTH_COOKIE, token.clone()))
        .http_only(true)
        .path("/")
        .build();

    Ok((
        StatusCode::OK,
        [(AUTHORIZATION, format!("Bearer {token}"))],
        jar.add(cookie),
        token,
    )
        .into_response())
}
