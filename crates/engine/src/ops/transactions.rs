use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, currencies, transaction_accounts, transaction_categories,
    transactions,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// The portion of a transaction booked against one account.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountSplit {
    pub account_id: i64,
    pub amount: Decimal,
    pub verified: bool,
}

/// The portion of a transaction attributed to one category, expressed in
/// that category's currency.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySplit {
    pub category_id: i64,
    pub amount: Decimal,
}

#[derive(Clone, Debug)]
pub struct TransactionInput {
    pub description: String,
    pub original_description: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub accounts: Vec<AccountSplit>,
    pub categories: Vec<CategorySplit>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionDetail {
    pub id: i64,
    pub description: String,
    pub original_description: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub accounts: Vec<AccountSplit>,
    pub categories: Vec<CategorySplit>,
}

impl Engine {
    /// Record a transaction with its account and category split lines.
    ///
    /// Every referenced account and category must resolve under the owner;
    /// a split referencing anything else is rejected before any row is
    /// written. Split pairs are unique per transaction.
    pub async fn create_transaction(
        &self,
        owner: &str,
        input: TransactionInput,
    ) -> ResultEngine<TransactionDetail> {
        let description = normalize_required_name(&input.description, "description", 200)?;
        let original_description = normalize_optional_text(input.original_description.as_deref());

        let mut seen_accounts = HashSet::new();
        for split in &input.accounts {
            if !seen_accounts.insert(split.account_id) {
                return Err(EngineError::BadRequest(
                    "duplicate account split".to_string(),
                ));
            }
        }
        let mut seen_categories = HashSet::new();
        for split in &input.categories {
            if !seen_categories.insert(split.category_id) {
                return Err(EngineError::BadRequest(
                    "duplicate category split".to_string(),
                ));
            }
        }

        with_tx!(self, |db_tx| {
            let currency = self
                .resolve_currency(&db_tx, owner, &input.currency)
                .await?
                .ok_or_else(|| {
                    EngineError::BadRequest(format!("unknown currency: {}", input.currency))
                })?;
            for split in &input.accounts {
                self.own_account(&db_tx, owner, split.account_id)
                    .await?
                    .ok_or_else(|| EngineError::BadRequest("account not found".to_string()))?;
            }
            for split in &input.categories {
                self.own_category(&db_tx, owner, split.category_id)
                    .await?
                    .ok_or_else(|| EngineError::BadRequest("category not found".to_string()))?;
            }

            let transaction = transactions::ActiveModel {
                id: ActiveValue::NotSet,
                owner_username: ActiveValue::Set(owner.to_string()),
                description: ActiveValue::Set(description.clone()),
                original_description: ActiveValue::Set(original_description.clone()),
                amount: ActiveValue::Set(input.amount),
                currency_id: ActiveValue::Set(currency.id),
                date: ActiveValue::Set(input.date),
            }
            .insert(&db_tx)
            .await?;

            for split in &input.accounts {
                transaction_accounts::ActiveModel {
                    transaction_id: ActiveValue::Set(transaction.id),
                    account_id: ActiveValue::Set(split.account_id),
                    amount: ActiveValue::Set(split.amount),
                    verified: ActiveValue::Set(split.verified),
                }
                .insert(&db_tx)
                .await?;
            }
            for split in &input.categories {
                transaction_categories::ActiveModel {
                    transaction_id: ActiveValue::Set(transaction.id),
                    category_id: ActiveValue::Set(split.category_id),
                    amount: ActiveValue::Set(split.amount),
                }
                .insert(&db_tx)
                .await?;
            }

            self.transaction_detail(&db_tx, transaction).await
        })
    }

    /// The owner's transactions, most recent first.
    pub async fn transactions(&self, owner: &str) -> ResultEngine<Vec<TransactionDetail>> {
        with_tx!(self, |db_tx| {
            let rows = transactions::Entity::find()
                .filter(transactions::Column::OwnerUsername.eq(owner))
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;
            let mut details = Vec::with_capacity(rows.len());
            for row in rows {
                details.push(self.transaction_detail(&db_tx, row).await?);
            }
            Ok(details)
        })
    }

    pub async fn transaction(&self, owner: &str, id: i64) -> ResultEngine<TransactionDetail> {
        with_tx!(self, |db_tx| {
            let row = self
                .own_transaction(&db_tx, owner, id)
                .await?
                .ok_or_else(|| EngineError::NotFound("transaction".to_string()))?;
            self.transaction_detail(&db_tx, row).await
        })
    }

    /// Delete a transaction together with its split lines.
    pub async fn delete_transaction(&self, owner: &str, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.own_transaction(&db_tx, owner, id)
                .await?
                .ok_or_else(|| EngineError::NotFound("transaction".to_string()))?;
            transaction_accounts::Entity::delete_many()
                .filter(transaction_accounts::Column::TransactionId.eq(id))
                .exec(&db_tx)
                .await?;
            transaction_categories::Entity::delete_many()
                .filter(transaction_categories::Column::TransactionId.eq(id))
                .exec(&db_tx)
                .await?;
            transactions::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    async fn own_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        id: i64,
    ) -> ResultEngine<Option<transactions::Model>> {
        transactions::Entity::find_by_id(id)
            .filter(transactions::Column::OwnerUsername.eq(owner))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }

    async fn transaction_detail(
        &self,
        db_tx: &DatabaseTransaction,
        transaction: transactions::Model,
    ) -> ResultEngine<TransactionDetail> {
        let currency = currencies::Entity::find_by_id(transaction.currency_id)
            .one(db_tx)
            .await?
            .map(|currency| currency.code)
            .unwrap_or_default();
        let accounts = transaction_accounts::Entity::find()
            .filter(transaction_accounts::Column::TransactionId.eq(transaction.id))
            .order_by_asc(transaction_accounts::Column::AccountId)
            .all(db_tx)
            .await?
            .into_iter()
            .map(|row| AccountSplit {
                account_id: row.account_id,
                amount: row.amount,
                verified: row.verified,
            })
            .collect();
        let categories = transaction_categories::Entity::find()
            .filter(transaction_categories::Column::TransactionId.eq(transaction.id))
            .order_by_asc(transaction_categories::Column::CategoryId)
            .all(db_tx)
            .await?
            .into_iter()
            .map(|row| CategorySplit {
                category_id: row.category_id,
                amount: row.amount,
            })
            .collect();
        Ok(TransactionDetail {
            id: transaction.id,
            description: transaction.description,
            original_description: transaction.original_description,
            amount: transaction.amount,
            currency,
            date: transaction.date,
            accounts,
            categories,
        })
    }
}
