//! Order upload and listing routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use gophermart_core::orders::{Order, OrderStatus, SubmitOutcome};
use gophermart_db::OrderRepository;
use gophermart_shared::types::Amount;

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/user/orders", post(upload_order).get(list_orders))
}

/// One entry of the order list.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order number.
    pub number: String,
    /// Current status.
    pub status: OrderStatus,
    /// Points earned, in major units; only present once processed.
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub accrual: Option<Decimal>,
    /// Upload time, RFC 3339.
    pub uploaded_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            number: order.number,
            status: order.status,
            accrual: order.accrual.map(Amount::to_major),
            uploaded_at: order.uploaded_at.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}

/// POST /api/user/orders - Upload an order number (plain-text body).
async fn upload_order(
    State(state): State<AppState>,
    auth: AuthUser,
    body: String,
) -> Result<StatusCode, ApiError> {
    let number = body.trim();
    if number.is_empty() {
        return Err(ApiError::bad_request("Order number is required"));
    }

    let repo = OrderRepository::new((*state.db).clone());
    match repo.submit(number, auth.user_id()).await? {
        SubmitOutcome::Created(order) => {
            info!(order = %order.number, user_id = %order.user_id, "Order accepted");
            Ok(StatusCode::ACCEPTED)
        }
        SubmitOutcome::AlreadyRegistered(_) => Ok(StatusCode::OK),
    }
}

/// GET /api/user/orders - List the caller's orders, oldest first.
async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, ApiError> {
    let repo = OrderRepository::new((*state.db).clone());
    let orders = repo.list_by_user(auth.user_id()).await?;

    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok((StatusCode::OK, Json(items)).into_response())
}
