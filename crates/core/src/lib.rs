//! Core business logic for Gophermart.
//!
//! This crate contains the domain rules with no database or web-server
//! dependencies; the accrual client is the only outbound HTTP. Storage is reached through traits implemented in
//! `gophermart-db`.
//!
//! # Modules
//!
//! - `luhn` - Order number checksum
//! - `orders` - Order status machine and submission outcomes
//! - `ledger` - Balance and withdrawal domain types
//! - `accrual` - Client for the external accrual system
//! - `reconcile` - Background worker resolving pending orders
//! - `auth` - Password hashing

pub mod accrual;
pub mod auth;
pub mod ledger;
pub mod luhn;
pub mod orders;
pub mod reconcile;
