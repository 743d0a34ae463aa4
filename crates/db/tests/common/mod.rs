//! Shared helpers for repository integration tests.
//!
//! Every test gets its own in-memory SQLite database. The pool is pinned to a
//! single connection because each SQLite in-memory connection is a separate
//! database; inside a transaction only the transaction handle may be used.

#![allow(dead_code)]

use gophermart_db::migration::{Migrator, MigratorTrait};
use gophermart_db::{LedgerRepository, UserRepository};
use gophermart_shared::config::DatabaseConfig;
use gophermart_shared::types::{Amount, UserId};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Connects to a fresh in-memory database with the schema applied.
pub async fn setup_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        run_migrations: true,
    };
    let db = gophermart_db::connect(&config)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Registers a user with a unique login.
pub async fn create_user(db: &DatabaseConnection) -> UserId {
    let login = format!("user-{}", Uuid::new_v4());
    let user = UserRepository::new(db.clone())
        .create(&login, "$argon2id$test_hash")
        .await
        .expect("Failed to create user");
    UserId::from_uuid(user.id)
}

/// Registers a user and credits `minor` points.
pub async fn create_funded_user(db: &DatabaseConnection, minor: i64) -> UserId {
    let user_id = create_user(db).await;
    LedgerRepository::credit(db, user_id, Amount::from_minor(minor))
        .await
        .expect("Failed to credit user");
    user_id
}
