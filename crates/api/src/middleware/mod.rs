//! Request middleware.

pub mod auth;

pub use auth::{AUTH_COOKIE, AuthUser, auth_middleware};
