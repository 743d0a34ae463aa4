//! Balance, withdrawal and withdrawal history routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::parse_json;
use crate::{AppState, error::ApiError, middleware::AuthUser};
use gophermart_core::ledger::{BalanceSnapshot, Withdrawal};
use gophermart_db::LedgerRepository;
use gophermart_shared::types::Amount;

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/balance", get(get_balance))
        .route("/api/user/balance/withdraw", post(withdraw))
        .route("/api/user/withdrawals", get(list_withdrawals))
        .route("/api/user/balance/withdrawals", get(list_withdrawals))
}

/// Current balance and lifetime withdrawn total, in major units.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Spendable points.
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    /// Points spent so far.
    #[serde(with = "rust_decimal::serde::float")]
    pub withdrawn: Decimal,
}

impl From<BalanceSnapshot> for BalanceResponse {
    fn from(snapshot: BalanceSnapshot) -> Self {
        Self {
            current: snapshot.current.to_major(),
            withdrawn: snapshot.withdrawn.to_major(),
        }
    }
}

/// Withdrawal request body.
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    /// Number the points are spent against.
    pub order: String,
    /// Points to spend, in major units.
    pub sum: Decimal,
}

/// One entry of the withdrawal history.
#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    /// Number the points were spent against.
    pub order: String,
    /// Points spent, in major units.
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    /// Processing time, RFC 3339.
    pub processed_at: String,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(withdrawal: Withdrawal) -> Self {
        Self {
            order: withdrawal.number,
            sum: withdrawal.sum.to_major(),
            processed_at: withdrawal
                .processed_at
                .to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}

/// GET /api/user/balance
async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let repo = LedgerRepository::new((*state.db).clone());
    let snapshot = repo.balance(auth.user_id()).await?;
    Ok(Json(snapshot.into()))
}

/// POST /api/user/balance/withdraw - Spend points against an order number.
async fn withdraw(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let request: WithdrawRequest = parse_json(&body)?;
    let sum = Amount::from_major(request.sum)
        .map_err(|e| ApiError::bad_request(format!("Invalid sum: {e}")))?;

    let repo = LedgerRepository::new((*state.db).clone());
    let withdrawal = repo
        .withdraw(request.order.trim(), sum, auth.user_id())
        .await?;

    info!(
        order = %withdrawal.number,
        user_id = %withdrawal.user_id,
        "Withdrawal accepted"
    );
    Ok(StatusCode::OK)
}

/// GET /api/user/withdrawals - The caller's withdrawals, oldest first.
async fn list_withdrawals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, ApiError> {
    let repo = LedgerRepository::new((*state.db).clone());
    let withdrawals = repo.list_withdrawals(auth.user_id()).await?;

    if withdrawals.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items: Vec<WithdrawalResponse> = withdrawals
        .into_iter()
        .map(WithdrawalResponse::from)
        .collect();
    Ok((StatusCode::OK, Json(items)).into_response())
}
