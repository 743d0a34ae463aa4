//! `SeaORM` Entity for withdrawals table.

use gophermart_core::ledger::Withdrawal;
use gophermart_shared::types::{Amount, UserId, WithdrawalId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    /// Debited points, minor units.
    pub sum: i64,
    pub processed_at: DateTimeWithTimeZone,
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

impl From<Model> for Withdrawal {
    fn from(model: Model) -> Self {
        Self {
            id: WithdrawalId::from_uuid(model.id),
            number: model.number,
            sum: Amount::from_minor(model.sum),
            processed_at: model.processed_at.to_utc(),
            user_id: UserId::from_uuid(model.user_id),
        }
    }
}
