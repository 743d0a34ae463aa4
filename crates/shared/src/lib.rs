//! Shared types, errors, and configuration for Gophermart.
//!
//! This crate provides common types used across all other crates:
//! - Money amounts in integer minor units
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - JWT issuing and validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, ConfigOverrides};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
