//! Order Store: ingestion and lookups for uploaded orders.

use chrono::Utc;
use gophermart_core::luhn;
use gophermart_core::orders::{Order, OrderError, OrderStatus, SubmitOutcome};
use gophermart_shared::types::{OrderId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::debug;

use super::is_unique_violation;
use crate::entities::orders;

fn db_error(err: DbErr) -> OrderError {
    OrderError::Database(err.to_string())
}

/// Order repository.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers `number` for `user_id`.
    ///
    /// Resubmitting a number the user already owns is not an error and
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// - `OrderError::InvalidNumber` if the number fails the Luhn check.
    /// - `OrderError::OwnedByAnotherUser` if someone else uploaded it first.
    /// - `OrderError::Database` on storage failure.
    pub async fn submit(&self, number: &str, user_id: UserId) -> Result<SubmitOutcome, OrderError> {
        if !luhn::is_valid(number) {
            return Err(OrderError::InvalidNumber(number.to_string()));
        }

        if let Some(existing) = self.find_by_number(number).await? {
            return Self::classify_existing(existing, user_id);
        }

        let order = orders::ActiveModel {
            id: Set(OrderId::new().into_inner()),
            number: Set(number.to_string()),
            status: Set(OrderStatus::New.as_str().to_string()),
            accrual: Set(None),
            uploaded_at: Set(Utc::now().into()),
            user_id: Set(user_id.into_inner()),
        };

        match order.insert(&self.db).await {
            Ok(model) => Ok(SubmitOutcome::Created(model.into_domain().map_err(db_error)?)),
            Err(e) if is_unique_violation(&e) => {
                debug!(order = %number, "Concurrent upload of the same number, re-reading");
                let existing = self
                    .find_by_number(number)
                    .await?
                    .ok_or_else(|| db_error(e))?;
                Self::classify_existing(existing, user_id)
            }
            Err(e) => Err(db_error(e)),
        }
    }

    fn classify_existing(existing: Order, user_id: UserId) -> Result<SubmitOutcome, OrderError> {
        if existing.user_id == user_id {
            Ok(SubmitOutcome::AlreadyRegistered(existing))
        } else {
            Err(OrderError::OwnedByAnotherUser(existing.number))
        }
    }

    /// Finds an order by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_number(&self, number: &str) -> Result<Option<Order>, OrderError> {
        orders::Entity::find()
            .filter(orders::Column::Number.eq(number))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(orders::Model::into_domain)
            .transpose()
            .map_err(db_error)
    }

    /// Lists a user's orders, oldest upload first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id.into_inner()))
            .order_by_asc(orders::Column::UploadedAt)
            .order_by_asc(orders::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(orders::Model::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)
    }

    /// Returns the oldest order still in `NEW` or `PROCESSING`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn next_unresolved(&self) -> Result<Option<Order>, OrderError> {
        orders::Entity::find()
            .filter(
                orders::Column::Status.is_in([
                    OrderStatus::New.as_str(),
                    OrderStatus::Processing.as_str(),
                ]),
            )
            .order_by_asc(orders::Column::UploadedAt)
            .order_by_asc(orders::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(orders::Model::into_domain)
            .transpose()
            .map_err(db_error)
    }
}
