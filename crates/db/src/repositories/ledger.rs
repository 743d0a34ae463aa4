//! Ledger Manager: balance mutations and withdrawals.
//!
//! Balances only change through [`LedgerRepository::credit`] and
//! [`LedgerRepository::debit`], each a single UPDATE statement. Both take any
//! connection so they compose into a caller's transaction.

use chrono::Utc;
use gophermart_core::ledger::{BalanceSnapshot, LedgerError, Withdrawal, validate_withdrawal};
use gophermart_shared::types::{Amount, UserId, WithdrawalId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use super::is_unique_violation;
use crate::entities::{orders, users, withdrawals};

fn db_error(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds `amount` to the user's balance.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` if `amount` is negative.
    /// - `LedgerError::UserNotFound` if the user does not exist.
    pub async fn credit<C: ConnectionTrait>(
        conn: &C,
        user_id: UserId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount.is_negative() {
            return Err(LedgerError::InvalidAmount);
        }

        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Balance,
                Expr::col(users::Column::Balance).add(amount.minor()),
            )
            .filter(users::Column::Id.eq(user_id.into_inner()))
            .exec(conn)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::UserNotFound(user_id.into_inner()));
        }

        Ok(())
    }

    /// Moves `amount` from the user's balance to their withdrawn total.
    ///
    /// The balance check and the update are one conditional statement, so
    /// concurrent debits can never overdraw. A failed debit changes nothing.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` if `amount` is not positive.
    /// - `LedgerError::InsufficientFunds` if the balance is below `amount`.
    /// - `LedgerError::UserNotFound` if the user does not exist.
    pub async fn debit<C: ConnectionTrait>(
        conn: &C,
        user_id: UserId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }

        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Balance,
                Expr::col(users::Column::Balance).sub(amount.minor()),
            )
            .col_expr(
                users::Column::Withdrawn,
                Expr::col(users::Column::Withdrawn).add(amount.minor()),
            )
            .filter(users::Column::Id.eq(user_id.into_inner()))
            .filter(users::Column::Balance.gte(amount.minor()))
            .exec(conn)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            let exists = users::Entity::find_by_id(user_id.into_inner())
                .one(conn)
                .await
                .map_err(db_error)?
                .is_some();
            return Err(if exists {
                LedgerError::InsufficientFunds
            } else {
                LedgerError::UserNotFound(user_id.into_inner())
            });
        }

        Ok(())
    }

    /// Stores a withdrawal record.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DuplicateWithdrawalNumber` if the number is
    /// already used by an order or a withdrawal.
    pub async fn record_withdrawal<C: ConnectionTrait>(
        conn: &C,
        number: &str,
        sum: Amount,
        user_id: UserId,
    ) -> Result<Withdrawal, LedgerError> {
        Self::ensure_number_unused(conn, number).await?;

        let withdrawal = withdrawals::ActiveModel {
            id: Set(WithdrawalId::new().into_inner()),
            number: Set(number.to_string()),
            sum: Set(sum.minor()),
            processed_at: Set(Utc::now().into()),
            user_id: Set(user_id.into_inner()),
        };

        withdrawal
            .insert(conn)
            .await
            .map(Withdrawal::from)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    LedgerError::DuplicateWithdrawalNumber(number.to_string())
                } else {
                    db_error(e)
                }
            })
    }

    /// Spends `sum` points against `number`.
    ///
    /// Checks run in order: Luhn, positive sum, number unused. The debit and
    /// the withdrawal record then commit in one transaction.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidNumber` / `LedgerError::InvalidAmount` for a bad request.
    /// - `LedgerError::DuplicateWithdrawalNumber` if the number is already used.
    /// - `LedgerError::InsufficientFunds` if the balance does not cover `sum`.
    pub async fn withdraw(
        &self,
        number: &str,
        sum: Amount,
        user_id: UserId,
    ) -> Result<Withdrawal, LedgerError> {
        validate_withdrawal(number, sum)?;
        Self::ensure_number_unused(&self.db, number).await?;

        let txn = self.db.begin().await.map_err(db_error)?;

        Self::debit(&txn, user_id, sum).await?;
        let withdrawal = Self::record_withdrawal(&txn, number, sum, user_id).await?;

        txn.commit().await.map_err(db_error)?;

        info!(
            order = %number,
            user_id = %user_id,
            sum = sum.minor(),
            "Withdrawal committed"
        );
        Ok(withdrawal)
    }

    /// Returns the user's current balance and withdrawn total.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UserNotFound` if the user does not exist.
    pub async fn balance(&self, user_id: UserId) -> Result<BalanceSnapshot, LedgerError> {
        let user = users::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::UserNotFound(user_id.into_inner()))?;

        Ok(BalanceSnapshot {
            current: Amount::from_minor(user.balance),
            withdrawn: Amount::from_minor(user.withdrawn),
        })
    }

    /// Lists a user's withdrawals, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, LedgerError> {
        let rows = withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(user_id.into_inner()))
            .order_by_asc(withdrawals::Column::ProcessedAt)
            .order_by_asc(withdrawals::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Withdrawal::from).collect())
    }

    /// Orders and withdrawals share one number space.
    async fn ensure_number_unused<C: ConnectionTrait>(
        conn: &C,
        number: &str,
    ) -> Result<(), LedgerError> {
        let in_orders = orders::Entity::find()
            .filter(orders::Column::Number.eq(number))
            .count(conn)
            .await
            .map_err(db_error)?;
        let in_withdrawals = withdrawals::Entity::find()
            .filter(withdrawals::Column::Number.eq(number))
            .count(conn)
            .await
            .map_err(db_error)?;

        if in_orders + in_withdrawals > 0 {
            return Err(LedgerError::DuplicateWithdrawalNumber(number.to_string()));
        }
        Ok(())
    }
}
