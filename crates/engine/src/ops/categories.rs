use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, categories, currencies, transaction_categories};

use super::{Engine, apply_rate, normalize_required_name, with_tx};

/// A category with its descendant subtree, children ordered by name at
/// every level.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTree {
    pub id: i64,
    pub name: String,
    pub currency: String,
    pub parent_id: Option<i64>,
    pub children: Vec<CategoryTree>,
}

/// Partial update: absent fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub parent: Option<ParentUpdate>,
}

/// Parent reassignment: detach to top level, or move under another
/// category of the same owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentUpdate {
    Detach,
    To(i64),
}

/// True iff `target` is `root` itself or appears anywhere in the subtree
/// hanging off `root`.
///
/// Recursion is bounded by tree depth; the reparent guard below is the
/// only thing keeping that depth finite, so every parent mutation must go
/// through it.
fn subtree_contains(children_of: &HashMap<i64, Vec<i64>>, root: i64, target: i64) -> bool {
    if root == target {
        return true;
    }
    children_of.get(&root).is_some_and(|children| {
        children
            .iter()
            .any(|&child| subtree_contains(children_of, child, target))
    })
}

fn child_index(models: &[categories::Model]) -> HashMap<i64, Vec<i64>> {
    let mut children_of: HashMap<i64, Vec<i64>> = HashMap::new();
    for model in models {
        if let Some(parent_id) = model.parent_id {
            children_of.entry(parent_id).or_default().push(model.id);
        }
    }
    children_of
}

/// Assembles the trees for one bucket of siblings. `models` must already
/// be name-ordered; the buckets then inherit that order.
fn build_level(
    parent: Option<i64>,
    buckets: &HashMap<Option<i64>, Vec<&categories::Model>>,
    codes: &HashMap<i64, String>,
) -> Vec<CategoryTree> {
    buckets
        .get(&parent)
        .map(|models| {
            models
                .iter()
                .map(|model| CategoryTree {
                    id: model.id,
                    name: model.name.clone(),
                    currency: codes.get(&model.currency_id).cloned().unwrap_or_default(),
                    parent_id: model.parent_id,
                    children: build_level(Some(model.id), buckets, codes),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn sibling_buckets(
    models: &[categories::Model],
) -> HashMap<Option<i64>, Vec<&categories::Model>> {
    let mut buckets: HashMap<Option<i64>, Vec<&categories::Model>> = HashMap::new();
    for model in models {
        buckets.entry(model.parent_id).or_default().push(model);
    }
    buckets
}

async fn owner_categories(
    db_tx: &DatabaseTransaction,
    owner: &str,
) -> ResultEngine<Vec<categories::Model>> {
    categories::Entity::find()
        .filter(categories::Column::OwnerUsername.eq(owner))
        .order_by_asc(categories::Column::Name)
        .all(db_tx)
        .await
        .map_err(Into::into)
}

async fn currency_codes(
    db_tx: &DatabaseTransaction,
    models: &[categories::Model],
) -> ResultEngine<HashMap<i64, String>> {
    if models.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<i64> = models.iter().map(|model| model.currency_id).collect();
    let rows = currencies::Entity::find()
        .filter(currencies::Column::Id.is_in(ids))
        .all(db_tx)
        .await?;
    Ok(rows.into_iter().map(|row| (row.id, row.code)).collect())
}

impl Engine {
    /// Fetch a category scoped strictly to its owner. A category owned by
    /// someone else behaves exactly like a missing one.
    pub(super) async fn own_category(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        id: i64,
    ) -> ResultEngine<Option<categories::Model>> {
        categories::Entity::find_by_id(id)
            .filter(categories::Column::OwnerUsername.eq(owner))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }

    /// Top-level categories of the owner, each with its full descendant
    /// subtree, ordered by name.
    pub async fn list_categories(&self, owner: &str) -> ResultEngine<Vec<CategoryTree>> {
        with_tx!(self, |db_tx| {
            let models = owner_categories(&db_tx, owner).await?;
            let codes = currency_codes(&db_tx, &models).await?;
            Ok(build_level(None, &sibling_buckets(&models), &codes))
        })
    }

    /// Read one category with its subtree.
    pub async fn category(&self, owner: &str, id: i64) -> ResultEngine<CategoryTree> {
        with_tx!(self, |db_tx| self.category_in_tx(&db_tx, owner, id).await)
    }

    pub(super) async fn category_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        id: i64,
    ) -> ResultEngine<CategoryTree> {
        let models = owner_categories(db_tx, owner).await?;
        let model = models
            .iter()
            .find(|model| model.id == id)
            .ok_or_else(|| EngineError::NotFound("category".to_string()))?;
        let codes = currency_codes(db_tx, &models).await?;
        let buckets = sibling_buckets(&models);
        Ok(CategoryTree {
            id: model.id,
            name: model.name.clone(),
            currency: codes.get(&model.currency_id).cloned().unwrap_or_default(),
            parent_id: model.parent_id,
            children: build_level(Some(model.id), &buckets, &codes),
        })
    }

    /// Create a category for the owner, optionally under one of their
    /// existing categories.
    pub async fn create_category(
        &self,
        owner: &str,
        name: &str,
        currency_code: &str,
        parent_id: Option<i64>,
    ) -> ResultEngine<CategoryTree> {
        let name = normalize_required_name(name, "category name", 50)?;
        with_tx!(self, |db_tx| {
            let currency = self
                .resolve_currency(&db_tx, owner, currency_code)
                .await?
                .ok_or_else(|| {
                    EngineError::BadRequest(format!("unknown currency: {currency_code}"))
                })?;
            if let Some(parent_id) = parent_id {
                self.own_category(&db_tx, owner, parent_id)
                    .await?
                    .ok_or_else(|| {
                        EngineError::BadRequest("parent category not found".to_string())
                    })?;
            }
            let model = categories::ActiveModel {
                id: ActiveValue::NotSet,
                owner_username: ActiveValue::Set(owner.to_string()),
                parent_id: ActiveValue::Set(parent_id),
                name: ActiveValue::Set(name),
                currency_id: ActiveValue::Set(currency.id),
            }
            .insert(&db_tx)
            .await?;
            Ok(CategoryTree {
                id: model.id,
                name: model.name,
                currency: currency.code,
                parent_id: model.parent_id,
                children: Vec::new(),
            })
        })
    }

    /// Apply a partial update to a category.
    ///
    /// A currency change runs the rescaling cascade over every linked
    /// transaction line before the field change lands, inside the same
    /// transaction. A parent change is validated against the containment
    /// check so a category can never end up underneath its own subtree.
    pub async fn update_category(
        &self,
        owner: &str,
        id: i64,
        changes: CategoryChanges,
    ) -> ResultEngine<CategoryTree> {
        let name = changes
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "category name", 50))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = self
                .own_category(&db_tx, owner, id)
                .await?
                .ok_or_else(|| EngineError::NotFound("category".to_string()))?;
            let mut active: categories::ActiveModel = model.clone().into();
            let mut dirty = false;

            if let Some(name) = name.clone() {
                active.name = ActiveValue::Set(name);
                dirty = true;
            }

            if let Some(code) = changes.currency.as_deref() {
                let new_currency = self
                    .resolve_currency(&db_tx, owner, code)
                    .await?
                    .ok_or_else(|| EngineError::BadRequest(format!("unknown currency: {code}")))?;
                if new_currency.id != model.currency_id {
                    let old_currency = currencies::Entity::find_by_id(model.currency_id)
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| EngineError::NotFound("currency".to_string()))?;
                    let rate = self
                        .rates()
                        .rate(&old_currency.code, &new_currency.code)
                        .ok_or_else(|| {
                            EngineError::BadRequest(format!(
                                "no conversion rate from {} to {}",
                                old_currency.code, new_currency.code
                            ))
                        })?;
                    self.rescale_category_lines(&db_tx, id, rate).await?;
                    active.currency_id = ActiveValue::Set(new_currency.id);
                    dirty = true;
                }
            }

            if let Some(parent) = changes.parent {
                match parent {
                    ParentUpdate::Detach => {
                        active.parent_id = ActiveValue::Set(None);
                        dirty = true;
                    }
                    ParentUpdate::To(parent_id) => {
                        self.own_category(&db_tx, owner, parent_id)
                            .await?
                            .ok_or_else(|| {
                                EngineError::BadRequest("parent category not found".to_string())
                            })?;
                        let models = owner_categories(&db_tx, owner).await?;
                        if subtree_contains(&child_index(&models), id, parent_id) {
                            return Err(EngineError::BadRequest(
                                "cannot move a category under its own subtree".to_string(),
                            ));
                        }
                        active.parent_id = ActiveValue::Set(Some(parent_id));
                        dirty = true;
                    }
                }
            }

            if dirty {
                active.update(&db_tx).await?;
            }
            self.category_in_tx(&db_tx, owner, id).await
        })
    }

    /// Delete a category. Children and linked transaction lines block the
    /// deletion; the caller has to dismantle the subtree explicitly.
    pub async fn delete_category(&self, owner: &str, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.own_category(&db_tx, owner, id)
                .await?
                .ok_or_else(|| EngineError::NotFound("category".to_string()))?;
            let has_children = categories::Entity::find()
                .filter(categories::Column::ParentId.eq(id))
                .one(&db_tx)
                .await?
                .is_some();
            if has_children {
                return Err(EngineError::BadRequest(
                    "category still has child categories".to_string(),
                ));
            }
            let has_lines = transaction_categories::Entity::find()
                .filter(transaction_categories::Column::CategoryId.eq(id))
                .one(&db_tx)
                .await?
                .is_some();
            if has_lines {
                return Err(EngineError::BadRequest(
                    "category still has transaction lines".to_string(),
                ));
            }
            categories::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Rescale every transaction line booked against `category_id` by
    /// `rate`, preserving the represented monetary value across a currency
    /// reassignment.
    async fn rescale_category_lines(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: i64,
        rate: Decimal,
    ) -> ResultEngine<()> {
        let lines = transaction_categories::Entity::find()
            .filter(transaction_categories::Column::CategoryId.eq(category_id))
            .all(db_tx)
            .await?;
        for line in lines {
            let rescaled = apply_rate(line.amount, rate);
            let mut active: transaction_categories::ActiveModel = line.into();
            active.amount = ActiveValue::Set(rescaled);
            active.update(db_tx).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: i64, parent_id: Option<i64>, name: &str) -> categories::Model {
        categories::Model {
            id,
            owner_username: "alice".to_string(),
            parent_id,
            name: name.to_string(),
            currency_id: 1,
        }
    }

    #[test]
    fn subtree_contains_finds_self_and_descendants() {
        // 1 -> 2 -> 3, 1 -> 4
        let models = vec![
            model(1, None, "a"),
            model(2, Some(1), "b"),
            model(3, Some(2), "c"),
            model(4, Some(1), "d"),
        ];
        let index = child_index(&models);
        assert!(subtree_contains(&index, 1, 1));
        assert!(subtree_contains(&index, 1, 3));
        assert!(subtree_contains(&index, 2, 3));
        assert!(!subtree_contains(&index, 2, 4));
        assert!(!subtree_contains(&index, 3, 1));
    }

    #[test]
    fn build_level_nests_children_in_name_order() {
        // name-ordered input, two roots, one nested level
        let models = vec![
            model(3, Some(1), "Bakery"),
            model(1, None, "Food"),
            model(2, Some(1), "Groceries"),
            model(4, None, "Rent"),
        ];
        let codes = HashMap::from([(1, "EUR".to_string())]);
        let forest = build_level(None, &sibling_buckets(&models), &codes);

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name, "Food");
        assert_eq!(forest[1].name, "Rent");
        let children: Vec<&str> = forest[0]
            .children
            .iter()
            .map(|child| child.name.as_str())
            .collect();
        assert_eq!(children, vec!["Bakery", "Groceries"]);
        assert_eq!(forest[0].currency, "EUR");
    }
}
