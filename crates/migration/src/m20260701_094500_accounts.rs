//! Accounts and their ownership records.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    CurrencyId,
    StartBalance,
}

#[derive(Iden)]
enum AccountOwners {
    Table,
    AccountId,
    OwnerUsername,
}

#[derive(Iden)]
enum Users {
    Table,
    Username,
}

#[derive(Iden)]
enum Currencies {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Accounts::CurrencyId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Accounts::StartBalance)
                            .decimal_len(15, 3)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-currency_id")
                            .from(Accounts::Table, Accounts::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountOwners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountOwners::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountOwners::OwnerUsername)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AccountOwners::AccountId)
                            .col(AccountOwners::OwnerUsername),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_owners-account_id")
                            .from(AccountOwners::Table, AccountOwners::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_owners-owner_username")
                            .from(AccountOwners::Table, AccountOwners::OwnerUsername)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountOwners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
