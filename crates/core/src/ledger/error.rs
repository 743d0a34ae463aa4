//! Ledger error types.

use gophermart_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Withdrawal number fails the Luhn check.
    #[error("Order number {0:?} is invalid")]
    InvalidNumber(String),

    /// Amount is zero or negative where a positive amount is required.
    #[error("Amount must be positive")]
    InvalidAmount,

    /// The balance does not cover the requested debit.
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// The number is already used by an order or another withdrawal.
    #[error("Order number {0} has already been used")]
    DuplicateWithdrawalNumber(String),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidNumber(_) => "INVALID_ORDER_NUMBER",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::DuplicateWithdrawalNumber(_) => "DUPLICATE_ORDER_NUMBER",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount => 400,
            Self::InsufficientFunds => 402,
            Self::UserNotFound(_) => 404,
            Self::DuplicateWithdrawalNumber(_) => 409,
            Self::InvalidNumber(_) => 422,
            Self::Database(_) => 500,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InvalidNumber(_) => Self::BusinessRule(message),
            LedgerError::InvalidAmount => Self::Validation(message),
            LedgerError::InsufficientFunds => Self::InsufficientFunds(message),
            LedgerError::DuplicateWithdrawalNumber(_) => Self::Conflict(message),
            LedgerError::UserNotFound(_) => Self::NotFound(message),
            LedgerError::Database(msg) => Self::Database(msg),
        }
    }
}
