//! Background reconciliation of pending orders against the accrual system.
//!
//! One [`ReconciliationWorker`] polls the oldest unresolved order, asks the
//! accrual system about it and hands the answer to a [`ReconcileStore`],
//! which updates the order and credits the owner in one transaction.

pub mod store;
pub mod worker;

pub use store::{ApplyOutcome, ReconcileError, ReconcileStore, Resolution};
pub use worker::{IterationOutcome, MAX_RATE_LIMIT_PAUSE, ReconciliationWorker};

#[cfg(test)]
pub use store::MockReconcileStore;
