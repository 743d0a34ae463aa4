//! `SeaORM` Entity for orders table.

use gophermart_core::orders::{Order, OrderStatus};
use gophermart_shared::types::{Amount, OrderId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    /// One of `NEW`, `PROCESSING`, `PROCESSED`, `INVALID`.
    pub status: String,
    /// Reward in minor units, set once processed.
    pub accrual: Option<i64>,
    pub uploaded_at: DateTimeWithTimeZone,
    pub user_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the domain order.
    ///
    /// # Errors
    ///
    /// Returns `DbErr::Type` if the stored status is not a known value.
    pub fn into_domain(self) -> Result<Order, DbErr> {
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| DbErr::Type(format!("unknown order status {:?}", self.status)))?;

        Ok(Order {
            id: OrderId::from_uuid(self.id),
            number: self.number,
            status,
            accrual: self.accrual.map(Amount::from_minor),
            uploaded_at: self.uploaded_at.to_utc(),
            user_id: UserId::from_uuid(self.user_id),
        })
    }
}
