//! Ledger domain types.

use chrono::{DateTime, Utc};
use gophermart_shared::types::{Amount, UserId, WithdrawalId};

/// A user's balance at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// Spendable balance.
    pub current: Amount,
    /// Total ever withdrawn.
    pub withdrawn: Amount,
}

/// A completed withdrawal. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Internal identifier.
    pub id: WithdrawalId,
    /// Order number the points were spent against.
    pub number: String,
    /// Debited amount, always positive.
    pub sum: Amount,
    /// When the debit was committed.
    pub processed_at: DateTime<Utc>,
    /// Owner.
    pub user_id: UserId,
}
