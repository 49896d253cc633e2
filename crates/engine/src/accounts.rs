//! Accounts table.
//!
//! Ownership is not a column here; it goes through the `account_owners`
//! link table, which is what every owner-scoped lookup joins on.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub currency_id: i64,
    #[sea_orm(column_type = "Decimal(Some((15, 3)))")]
    pub start_balance: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currency,
    #[sea_orm(has_many = "super::account_owners::Entity")]
    Owners,
}

impl Related<super::account_owners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
