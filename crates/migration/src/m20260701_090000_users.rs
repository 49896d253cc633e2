//! Users, their email addresses and their contact links.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    FirstName,
    LastName,
    PreferredCurrencyId,
}

#[derive(Iden)]
enum UserEmails {
    Table,
    UserUsername,
    EmailAddress,
}

#[derive(Iden)]
enum UserContacts {
    Table,
    UserUsername,
    ContactUsername,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    // No FK here: currencies reference users for ownership,
                    // so declaring both directions would be circular.
                    .col(
                        ColumnDef::new(Users::PreferredCurrencyId)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserEmails::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserEmails::UserUsername).string().not_null())
                    .col(ColumnDef::new(UserEmails::EmailAddress).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserEmails::UserUsername)
                            .col(UserEmails::EmailAddress),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_emails-user_username")
                            .from(UserEmails::Table, UserEmails::UserUsername)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserContacts::UserUsername)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserContacts::ContactUsername)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserContacts::UserUsername)
                            .col(UserContacts::ContactUsername),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_contacts-user_username")
                            .from(UserContacts::Table, UserContacts::UserUsername)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_contacts-contact_username")
                            .from(UserContacts::Table, UserContacts::ContactUsername)
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
            .drop_table(Table::drop().table(UserContacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserEmails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
