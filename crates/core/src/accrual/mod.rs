//! Adapter for the external accrual system.
//!
//! The worker only sees [`AccrualClient`] and the closed set of
//! [`AccrualOutcome`] variants; transport details stay in [`http`].

pub mod client;
pub mod http;

pub use client::{AccrualClient, AccrualOutcome};
pub use http::HttpAccrualClient;

#[cfg(test)]
pub use client::MockAccrualClient;
