//! `SeaORM` entity definitions.

pub mod orders;
pub mod users;
pub mod withdrawals;

pub mod prelude {
    //! Entity re-exports.
    pub use super::orders::Entity as Orders;
    pub use super::users::Entity as Users;
    pub use super::withdrawals::Entity as Withdrawals;
}
