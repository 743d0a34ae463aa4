//! Liveness check backed by the database.

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tracing::warn;

use crate::AppState;

/// GET /ping - 200 when the database answers, 503 otherwise.
async fn ping(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ping", get(ping))
}
