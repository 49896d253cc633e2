use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, account_owners, accounts, currencies, transaction_accounts,
};

use super::{Engine, normalize_required_name, with_tx};

#[derive(Clone, Debug, PartialEq)]
pub struct AccountInfo {
    pub id: i64,
    pub name: String,
    pub currency: String,
    pub start_balance: Decimal,
}

/// Partial update: absent fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub start_balance: Option<Decimal>,
}

impl Engine {
    /// Fetch an account through its ownership record. Accounts owned by
    /// someone else behave as absent.
    pub(super) async fn own_account(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        id: i64,
    ) -> ResultEngine<Option<accounts::Model>> {
        let row = account_owners::Entity::find_by_id((id, owner.to_string()))
            .find_also_related(accounts::Entity)
            .one(db_tx)
            .await?;
        Ok(row.and_then(|(_, account)| account))
    }

    pub async fn list_accounts(&self, owner: &str) -> ResultEngine<Vec<AccountInfo>> {
        with_tx!(self, |db_tx| {
            let rows = account_owners::Entity::find()
                .filter(account_owners::Column::OwnerUsername.eq(owner))
                .find_also_related(accounts::Entity)
                .all(&db_tx)
                .await?;
            let mut infos = Vec::with_capacity(rows.len());
            for (_, account) in rows {
                let Some(account) = account else { continue };
                infos.push(self.account_info(&db_tx, account).await?);
            }
            infos.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(infos)
        })
    }

    pub async fn create_account(
        &self,
        owner: &str,
        name: &str,
        currency_code: &str,
        start_balance: Decimal,
    ) -> ResultEngine<AccountInfo> {
        let name = normalize_required_name(name, "account name", 50)?;
        with_tx!(self, |db_tx| {
            let currency = self
                .resolve_currency(&db_tx, owner, currency_code)
                .await?
                .ok_or_else(|| {
                    EngineError::BadRequest(format!("unknown currency: {currency_code}"))
                })?;
            let account = accounts::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                currency_id: ActiveValue::Set(currency.id),
                start_balance: ActiveValue::Set(start_balance),
            }
            .insert(&db_tx)
            .await?;
            account_owners::ActiveModel {
                account_id: ActiveValue::Set(account.id),
                owner_username: ActiveValue::Set(owner.to_string()),
            }
            .insert(&db_tx)
            .await?;
            Ok(AccountInfo {
                id: account.id,
                name: account.name,
                currency: currency.code,
                start_balance: account.start_balance,
            })
        })
    }

    pub async fn account(&self, owner: &str, id: i64) -> ResultEngine<AccountInfo> {
        with_tx!(self, |db_tx| {
            let account = self
                .own_account(&db_tx, owner, id)
                .await?
                .ok_or_else(|| EngineError::NotFound("account".to_string()))?;
            self.account_info(&db_tx, account).await
        })
    }

    pub async fn update_account(
        &self,
        owner: &str,
        id: i64,
        changes: AccountChanges,
    ) -> ResultEngine<AccountInfo> {
        let name = changes
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "account name", 50))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let account = self
                .own_account(&db_tx, owner, id)
                .await?
                .ok_or_else(|| EngineError::NotFound("account".to_string()))?;
            let mut active: accounts::ActiveModel = account.clone().into();
            let mut dirty = false;
            if let Some(name) = name.clone() {
                active.name = ActiveValue::Set(name);
                dirty = true;
            }
            if let Some(start_balance) = changes.start_balance {
                active.start_balance = ActiveValue::Set(start_balance);
                dirty = true;
            }
            let account = if dirty {
                active.update(&db_tx).await?
            } else {
                account
            };
            self.account_info(&db_tx, account).await
        })
    }

    /// Delete an account. Linked transaction lines block the deletion.
    pub async fn delete_account(&self, owner: &str, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.own_account(&db_tx, owner, id)
                .await?
                .ok_or_else(|| EngineError::NotFound("account".to_string()))?;
            let has_lines = transaction_accounts::Entity::find()
                .filter(transaction_accounts::Column::AccountId.eq(id))
                .one(&db_tx)
                .await?
                .is_some();
            if has_lines {
                return Err(EngineError::BadRequest(
                    "account still has transaction lines".to_string(),
                ));
            }
            account_owners::Entity::delete_by_id((id, owner.to_string()))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    async fn account_info(
        &self,
        db_tx: &DatabaseTransaction,
        account: accounts::Model,
    ) -> ResultEngine<AccountInfo> {
        let code = currencies::Entity::find_by_id(account.currency_id)
            .one(db_tx)
            .await?
            .map(|currency| currency.code)
            .unwrap_or_default();
        Ok(AccountInfo {
            id: account.id,
            name: account.name,
            currency: code,
            start_balance: account.start_balance,
        })
    }
}
