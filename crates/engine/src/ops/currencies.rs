use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    EngineError, ResultEngine, accounts, categories, currencies, transactions, users,
};

use super::{Engine, normalize_required_name, with_tx};

/// A currency row as seen by its owner: shared rows have no owner.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrencyInfo {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub owner: Option<String>,
    pub rate: Decimal,
}

/// Partial update: absent fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct CurrencyChanges {
    pub name: Option<String>,
    pub rate: Option<Decimal>,
}

fn currency_info(model: currencies::Model) -> CurrencyInfo {
    CurrencyInfo {
        id: model.id,
        code: model.code,
        name: model.name,
        owner: model.owner_username,
        rate: model.rate,
    }
}

impl Engine {
    /// Resolve a currency code in the scope visible to `owner`: the user's
    /// own rows plus the shared (ownerless) ones.
    pub(super) async fn resolve_currency(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        code: &str,
    ) -> ResultEngine<Option<currencies::Model>> {
        let code = code.trim().to_uppercase();
        currencies::Entity::find()
            .filter(currencies::Column::Code.eq(code))
            .filter(
                Condition::any()
                    .add(currencies::Column::OwnerUsername.is_null())
                    .add(currencies::Column::OwnerUsername.eq(owner)),
            )
            .one(db_tx)
            .await
            .map_err(Into::into)
    }

    /// Shared currencies plus the user's own, ordered by code.
    pub async fn list_currencies(&self, owner: &str) -> ResultEngine<Vec<CurrencyInfo>> {
        with_tx!(self, |db_tx| {
            let models = currencies::Entity::find()
                .filter(
                    Condition::any()
                        .add(currencies::Column::OwnerUsername.is_null())
                        .add(currencies::Column::OwnerUsername.eq(owner)),
                )
                .order_by_asc(currencies::Column::Code)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(currency_info).collect())
        })
    }

    /// Create a currency owned by the user.
    ///
    /// `rate` is the value of one unit expressed in the owner's preferred
    /// currency; the user reconciler keeps it consistent when the preferred
    /// currency changes.
    pub async fn create_currency(
        &self,
        owner: &str,
        code: &str,
        name: &str,
        rate: Decimal,
    ) -> ResultEngine<CurrencyInfo> {
        let code = normalize_required_name(code, "currency code", 5)?.to_uppercase();
        let name = normalize_required_name(name, "currency name", 50)?;
        if rate <= Decimal::ZERO {
            return Err(EngineError::BadRequest(
                "currency rate must be positive".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            if self.resolve_currency(&db_tx, owner, &code).await?.is_some() {
                return Err(EngineError::BadRequest(format!(
                    "currency code already exists: {code}"
                )));
            }
            let model = currencies::ActiveModel {
                id: ActiveValue::NotSet,
                code: ActiveValue::Set(code),
                name: ActiveValue::Set(name),
                owner_username: ActiveValue::Set(Some(owner.to_string())),
                rate: ActiveValue::Set(rate),
            }
            .insert(&db_tx)
            .await?;
            Ok(currency_info(model))
        })
    }

    /// Update one of the user's own currencies. Shared rows are not
    /// reachable here and behave as absent.
    pub async fn update_currency(
        &self,
        owner: &str,
        id: i64,
        changes: CurrencyChanges,
    ) -> ResultEngine<CurrencyInfo> {
        let name = changes
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "currency name", 50))
            .transpose()?;
        if let Some(rate) = changes.rate {
            if rate <= Decimal::ZERO {
                return Err(EngineError::BadRequest(
                    "currency rate must be positive".to_string(),
                ));
            }
        }
        with_tx!(self, |db_tx| {
            let model = currencies::Entity::find_by_id(id)
                .filter(currencies::Column::OwnerUsername.eq(owner))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("currency".to_string()))?;
            let mut active: currencies::ActiveModel = model.clone().into();
            let mut dirty = false;
            if let Some(name) = name.clone() {
                active.name = ActiveValue::Set(name);
                dirty = true;
            }
            if let Some(rate) = changes.rate {
                active.rate = ActiveValue::Set(rate);
                dirty = true;
            }
            let model = if dirty {
                active.update(&db_tx).await?
            } else {
                model
            };
            Ok(currency_info(model))
        })
    }

    /// Delete one of the user's own currencies, unless something still
    /// references it.
    pub async fn delete_currency(&self, owner: &str, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            currencies::Entity::find_by_id(id)
                .filter(currencies::Column::OwnerUsername.eq(owner))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("currency".to_string()))?;

            let referenced = users::Entity::find()
                .filter(users::Column::PreferredCurrencyId.eq(id))
                .one(&db_tx)
                .await?
                .is_some()
                || categories::Entity::find()
                    .filter(categories::Column::CurrencyId.eq(id))
                    .one(&db_tx)
                    .await?
                    .is_some()
                || accounts::Entity::find()
                    .filter(accounts::Column::CurrencyId.eq(id))
                    .one(&db_tx)
                    .await?
                    .is_some()
                || transactions::Entity::find()
                    .filter(transactions::Column::CurrencyId.eq(id))
                    .one(&db_tx)
                    .await?
                    .is_some();
            if referenced {
                return Err(EngineError::BadRequest(
                    "currency is still in use".to_string(),
                ));
            }

            currencies::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
