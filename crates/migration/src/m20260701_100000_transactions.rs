//! Transactions and their account/category split lines.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    OwnerUsername,
    Description,
    OriginalDescription,
    Amount,
    CurrencyId,
    Date,
}

#[derive(Iden)]
enum TransactionAccounts {
    Table,
    TransactionId,
    AccountId,
    Amount,
    Verified,
}

#[derive(Iden)]
enum TransactionCategories {
    Table,
    TransactionId,
    CategoryId,
    Amount,
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

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::OwnerUsername)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Description)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::OriginalDescription).string_len(200),
                    )
                    .col(
                        ColumnDef::new(Transactions::Amount)
                            .decimal_len(15, 3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CurrencyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-owner_username")
                            .from(Transactions::Table, Transactions::OwnerUsername)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-currency_id")
                            .from(Transactions::Table, Transactions::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-owner_username-date")
                    .table(Transactions::Table)
                    .col(Transactions::OwnerUsername)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionAccounts::TransactionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionAccounts::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionAccounts::Amount)
                            .decimal_len(15, 3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionAccounts::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(TransactionAccounts::TransactionId)
                            .col(TransactionAccounts::AccountId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_accounts-transaction_id")
                            .from(
                                TransactionAccounts::Table,
                                TransactionAccounts::TransactionId,
                            )
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_accounts-account_id")
                            .from(TransactionAccounts::Table, TransactionAccounts::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionCategories::TransactionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionCategories::CategoryId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionCategories::Amount)
                            .decimal_len(15, 3)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TransactionCategories::TransactionId)
                            .col(TransactionCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_categories-transaction_id")
                            .from(
                                TransactionCategories::Table,
                                TransactionCategories::TransactionId,
                            )
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_categories-category_id")
                            .from(
                                TransactionCategories::Table,
                                TransactionCategories::CategoryId,
                            )
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_categories-category_id")
                    .table(TransactionCategories::Table)
                    .col(TransactionCategories::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        Ok(())
    }
}
