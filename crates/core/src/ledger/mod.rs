//! Balance and withdrawal bookkeeping.
//!
//! This module holds the pure parts of the ledger:
//! - Error types for credit, debit and withdrawal
//! - Balance snapshots and withdrawal records
//! - Validation of withdrawal requests
//!
//! The storage-backed Ledger Manager lives in `gophermart-db`.

pub mod error;
pub mod types;
pub mod validation;

pub use error::LedgerError;
pub use types::{BalanceSnapshot, Withdrawal};
pub use validation::validate_withdrawal;
