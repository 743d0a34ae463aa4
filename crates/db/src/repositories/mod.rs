//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod ledger;
pub mod order;
pub mod reconcile;
pub mod user;

pub use ledger::LedgerRepository;
pub use order::OrderRepository;
pub use reconcile::ReconcileRepository;
pub use user::{UserError, UserRepository};

use sea_orm::{DbErr, SqlErr};

/// Returns true if `err` is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
