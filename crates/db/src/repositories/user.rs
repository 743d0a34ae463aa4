//! User repository for database operations.

use chrono::Utc;
use gophermart_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

use super::is_unique_violation;
use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Login is already registered.
    #[error("Login {0} is already taken")]
    LoginTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// User repository for account lookup and registration.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Creates a new user with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `UserError::LoginTaken` if the login exists, including when a
    /// concurrent registration wins the race.
    pub async fn create(&self, login: &str, password_hash: &str) -> Result<users::Model, UserError> {
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            login: Set(login.to_string()),
            password_hash: Set(password_hash.to_string()),
            balance: Set(0),
            withdrawn: Set(0),
            created_at: Set(Utc::now().into()),
        };

        user.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::LoginTaken(login.to_string())
            } else {
                UserError::Database(e)
            }
        })
    }

    /// Checks if a login is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn login_exists(&self, login: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
