//! Order ingestion errors.

use gophermart_shared::AppError;
use thiserror::Error;

/// Errors returned when submitting or reading orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The number is empty, non-numeric or fails the Luhn check.
    #[error("Order number {0:?} is invalid")]
    InvalidNumber(String),

    /// The number was already uploaded by a different user.
    #[error("Order number {0} was uploaded by another user")]
    OwnedByAnotherUser(String),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidNumber(_) => Self::BusinessRule(err.to_string()),
            OrderError::OwnedByAnotherUser(_) => Self::Conflict(err.to_string()),
            OrderError::Database(msg) => Self::Database(msg),
        }
    }
}
