//! Credential handling.
//!
//! Passwords are stored as Argon2id PHC strings; login checks go through
//! [`verify_password`].

mod password;

pub use password::{PasswordError, hash_password, verify_password};
