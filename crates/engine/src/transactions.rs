//! Transactions table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_username: String,
    pub description: String,
    pub original_description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((15, 3)))")]
    pub amount: Decimal,
    pub currency_id: i64,
    pub date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerUsername",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currency,
    #[sea_orm(has_many = "super::transaction_accounts::Entity")]
    AccountLines,
    #[sea_orm(has_many = "super::transaction_categories::Entity")]
    CategoryLines,
}

impl Related<super::transaction_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
