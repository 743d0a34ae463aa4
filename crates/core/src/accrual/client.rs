//! Accrual client abstraction.

use std::time::Duration;

use async_trait::async_trait;
use gophermart_shared::types::Amount;

use crate::orders::OrderStatus;

/// What the accrual system said about one order.
///
/// Every call yields exactly one variant; transport failures are folded
/// into [`AccrualOutcome::TransientError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualOutcome {
    /// The accrual system knows the order.
    ///
    /// `status` is never `NEW`. `accrual` is only present with `PROCESSED`.
    Resolved {
        /// Status to move the order to.
        status: OrderStatus,
        /// Reward in minor units.
        accrual: Option<Amount>,
    },
    /// The order is not registered upstream yet.
    NotYetAvailable,
    /// Upstream asked us to slow down.
    RateLimited {
        /// Parsed `Retry-After`, if the header was present and numeric.
        retry_after: Option<Duration>,
    },
    /// Timeout, network failure, unexpected status or malformed body.
    TransientError {
        /// Human-readable cause, for logs only.
        reason: String,
    },
}

impl AccrualOutcome {
    pub(crate) fn transient(reason: impl Into<String>) -> Self {
        Self::TransientError {
            reason: reason.into(),
        }
    }
}

/// Client for the accrual system's per-order status endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccrualClient: Send + Sync {
    /// Asks the accrual system about `order_number`.
    async fn fetch_status(&self, order_number: &str) -> AccrualOutcome;
}
