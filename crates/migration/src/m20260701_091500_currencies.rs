//! Currencies: shared (ownerless) rows plus user-owned rows with a rate
//! against the owner's preferred currency. Seeds the shared set.

use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Currencies {
    Table,
    Id,
    Code,
    Name,
    OwnerUsername,
    Rate,
}

#[derive(Iden)]
enum Users {
    Table,
    Username,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Currencies::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Currencies::Code).string().not_null())
                    .col(ColumnDef::new(Currencies::Name).string().not_null())
                    .col(ColumnDef::new(Currencies::OwnerUsername).string())
                    .col(
                        ColumnDef::new(Currencies::Rate)
                            .decimal_len(15, 3)
                            .not_null()
                            .default("1.000"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-currencies-owner_username")
                            .from(Currencies::Table, Currencies::OwnerUsername)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-currencies-owner_username-code-unique")
                    .table(Currencies::Table)
                    .col(Currencies::OwnerUsername)
                    .col(Currencies::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        let backend = db.get_database_backend();
        db.execute(Statement::from_string(
            backend,
            "INSERT INTO currencies (code, name, owner_username, rate) VALUES \
             ('EUR', 'Euro', NULL, 1.000), \
             ('USD', 'US Dollar', NULL, 1.000), \
             ('GBP', 'Pound Sterling', NULL, 1.000), \
             ('CHF', 'Swiss Franc', NULL, 1.000), \
             ('JPY', 'Yen', NULL, 1.000);",
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Currencies::Table).to_owned())
            .await?;
        Ok(())
    }
}
