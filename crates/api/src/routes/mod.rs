//! API route definitions.

use axum::{Router, body::Bytes, middleware};
use serde::de::DeserializeOwned;

use crate::{AppState, error::ApiError, middleware::auth_middleware};

pub mod auth;
pub mod balance;
pub mod health;
pub mod orders;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(orders::routes())
        .merge(balance::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Decodes a JSON request body.
///
/// Any syntax or shape error is a 400, regardless of content type.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("Malformed body: {e}")))
}
