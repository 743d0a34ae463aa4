//! reqwest-based accrual client.
//!
//! Upstream contract, `GET {base}/api/orders/{number}`:
//!
//! | Status | Meaning |
//! |---|---|
//! | 200 | JSON `{order, status, accrual?}`; `accrual` in minor units |
//! | 204 | order not registered upstream |
//! | 429 | rate limited, optional `Retry-After` in seconds |
//! | other | transient failure |

use std::time::Duration;

use async_trait::async_trait;
use gophermart_shared::config::AccrualConfig;
use gophermart_shared::types::Amount;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::client::{AccrualClient, AccrualOutcome};
use crate::orders::OrderStatus;

/// Body of a 200 answer.
#[derive(Debug, Deserialize)]
struct AccrualResponse {
    order: String,
    status: String,
    #[serde(default)]
    accrual: Option<serde_json::Value>,
}

/// Accrual client talking HTTP to the accrual system.
#[derive(Debug, Clone)]
pub struct HttpAccrualClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAccrualClient {
    /// Creates a client for the configured accrual system.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &AccrualConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AccrualClient for HttpAccrualClient {
    async fn fetch_status(&self, order_number: &str) -> AccrualOutcome {
        let url = format!("{}/api/orders/{order_number}", self.base_url);

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return AccrualOutcome::transient("request timed out"),
            Err(e) => return AccrualOutcome::transient(format!("request failed: {e}")),
        };

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return AccrualOutcome::transient(format!("failed to read body: {e}")),
        };

        let outcome = classify(order_number, status, retry_after.as_deref(), &body);
        debug!(order = %order_number, http_status = %status, ?outcome, "Accrual system answered");
        outcome
    }
}

/// Maps a raw upstream answer to an [`AccrualOutcome`].
pub fn classify(
    order_number: &str,
    status: StatusCode,
    retry_after: Option<&str>,
    body: &[u8],
) -> AccrualOutcome {
    match status {
        StatusCode::OK => classify_body(order_number, body),
        StatusCode::NO_CONTENT => AccrualOutcome::NotYetAvailable,
        StatusCode::TOO_MANY_REQUESTS => AccrualOutcome::RateLimited {
            retry_after: retry_after.and_then(parse_retry_after),
        },
        other => AccrualOutcome::transient(format!("unexpected status {other}")),
    }
}

fn classify_body(order_number: &str, body: &[u8]) -> AccrualOutcome {
    let payload: AccrualResponse = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => return AccrualOutcome::transient(format!("malformed body: {e}")),
    };

    if payload.order != order_number {
        return AccrualOutcome::transient(format!(
            "answer for order {} while asking for {order_number}",
            payload.order
        ));
    }

    let status = match payload.status.as_str() {
        "REGISTERED" | "PROCESSING" => OrderStatus::Processing,
        "PROCESSED" => OrderStatus::Processed,
        "INVALID" => OrderStatus::Invalid,
        other => return AccrualOutcome::transient(format!("unknown status {other:?}")),
    };

    let accrual = match payload.accrual {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(minor) if minor >= 0 => Some(Amount::from_minor(minor)),
            _ => return AccrualOutcome::transient(format!("invalid accrual {n}")),
        },
        Some(other) => return AccrualOutcome::transient(format!("non-numeric accrual {other}")),
    };

    if accrual.is_some() && status != OrderStatus::Processed {
        return AccrualOutcome::transient(format!("accrual reported with status {status}"));
    }

    AccrualOutcome::Resolved { status, accrual }
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
