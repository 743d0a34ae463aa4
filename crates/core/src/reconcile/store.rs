//! Storage seam used by the reconciliation worker.

use async_trait::async_trait;
use gophermart_shared::types::Amount;
use thiserror::Error;

use crate::orders::{Order, OrderStatus};

/// The accrual system's verdict for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Status to move the order to.
    pub status: OrderStatus,
    /// Reward to record and credit; only with `PROCESSED`.
    pub accrual: Option<Amount>,
}

/// What happened when a resolution was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The order moved to the new status; `credited` is the amount added to
    /// the owner's balance in the same transaction.
    Applied {
        /// Credited amount, if any.
        credited: Option<Amount>,
    },
    /// Same status and no accrual; nothing was written.
    Unchanged,
    /// The order was no longer in the observed status. Nothing was written.
    Stale,
}

/// Errors raised by a [`ReconcileStore`].
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Storage failure; the iteration is retried later.
    #[error("storage error: {0}")]
    Storage(String),

    /// The resolution would break the order status machine.
    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}

/// Persistence operations needed by the worker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReconcileStore: Send + Sync {
    /// Returns the oldest order in `NEW` or `PROCESSING`, if any.
    async fn next_unresolved(&self) -> Result<Option<Order>, ReconcileError>;

    /// Applies `resolution` to `order` atomically.
    ///
    /// The status update is conditional on the order still being in
    /// `order.status`, and any accrual is credited in the same transaction.
    async fn apply_resolution(
        &self,
        order: &Order,
        resolution: Resolution,
    ) -> Result<ApplyOutcome, ReconcileError>;
}
