pub use sea_orm_migration::prelude::*;

mod m20260701_090000_users;
mod m20260701_091500_currencies;
mod m20260701_093000_categories;
mod m20260701_094500_accounts;
mod m20260701_100000_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260701_090000_users::Migration),
            Box::new(m20260701_091500_currencies::Migration),
            Box::new(m20260701_093000_categories::Migration),
            Box::new(m20260701_094500_accounts::Migration),
            Box::new(m20260701_100000_transactions::Migration),
        ]
    }
}
