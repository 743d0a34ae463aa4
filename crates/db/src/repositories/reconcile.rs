//! Storage side of the reconciliation worker.

use async_trait::async_trait;
use gophermart_core::orders::{Order, OrderStatus};
use gophermart_core::reconcile::{ApplyOutcome, ReconcileError, ReconcileStore, Resolution};
use gophermart_shared::types::Amount;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait, sea_query::Expr,
};

use super::{LedgerRepository, OrderRepository};
use crate::entities::orders;

fn storage_error(err: impl std::fmt::Display) -> ReconcileError {
    ReconcileError::Storage(err.to_string())
}

/// Applies accrual verdicts to orders and balances.
#[derive(Debug, Clone)]
pub struct ReconcileRepository {
    db: DatabaseConnection,
    orders: OrderRepository,
}

impl ReconcileRepository {
    /// Creates a new reconcile repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let orders = OrderRepository::new(db.clone());
        Self { db, orders }
    }
}

#[async_trait]
impl ReconcileStore for ReconcileRepository {
    async fn next_unresolved(&self) -> Result<Option<Order>, ReconcileError> {
        self.orders.next_unresolved().await.map_err(storage_error)
    }

    async fn apply_resolution(
        &self,
        order: &Order,
        resolution: Resolution,
    ) -> Result<ApplyOutcome, ReconcileError> {
        if !order.status.can_transition_to(resolution.status) {
            return Err(ReconcileError::IllegalTransition {
                from: order.status,
                to: resolution.status,
            });
        }

        // Accruals only exist on processed orders.
        let accrual = resolution
            .accrual
            .filter(|_| resolution.status == OrderStatus::Processed);

        if resolution.status == order.status && accrual.is_none() {
            return Ok(ApplyOutcome::Unchanged);
        }

        let txn = self.db.begin().await.map_err(storage_error)?;

        let updated = orders::Entity::update_many()
            .col_expr(
                orders::Column::Status,
                Expr::value(resolution.status.as_str()),
            )
            .col_expr(orders::Column::Accrual, Expr::value(accrual.map(Amount::minor)))
            .filter(orders::Column::Id.eq(order.id.into_inner()))
            .filter(orders::Column::Status.eq(order.status.as_str()))
            .exec(&txn)
            .await
            .map_err(storage_error)?;

        if updated.rows_affected == 0 {
            txn.rollback().await.map_err(storage_error)?;
            return Ok(ApplyOutcome::Stale);
        }

        if let Some(amount) = accrual {
            LedgerRepository::credit(&txn, order.user_id, amount)
                .await
                .map_err(storage_error)?;
        }

        txn.commit().await.map_err(storage_error)?;

        Ok(ApplyOutcome::Applied { credited: accrual })
    }
}
