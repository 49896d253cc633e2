use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{EngineError, ResultEngine, currencies, user_emails, users};

use super::{Engine, apply_rate, normalize_required_name, with_tx};

/// A user profile as returned by the API.
///
/// `preferred_currency` and `emails` are only filled in when a user reads
/// their own profile; other users get the bare identity fields.
#[derive(Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub preferred_currency: Option<String>,
    pub emails: Option<Vec<String>>,
}

/// Partial update: absent fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_currency: Option<String>,
}

impl Engine {
    /// Read a user profile. Reading one's own profile includes the
    /// preferred currency and the registered email addresses.
    pub async fn user(&self, requestor: &str, username: &str) -> ResultEngine<UserProfile> {
        with_tx!(self, |db_tx| {
            self.load_profile(&db_tx, requestor, username).await
        })
    }

    pub(super) async fn load_profile(
        &self,
        db_tx: &DatabaseTransaction,
        requestor: &str,
        username: &str,
    ) -> ResultEngine<UserProfile> {
        let user = users::Entity::find_by_id(username)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))?;

        if username != requestor {
            return Ok(UserProfile {
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                preferred_currency: None,
                emails: None,
            });
        }

        let preferred = currencies::Entity::find_by_id(user.preferred_currency_id)
            .one(db_tx)
            .await?
            .map(|currency| currency.code);
        let emails = user_emails::Entity::find()
            .filter(user_emails::Column::UserUsername.eq(username))
            .order_by_asc(user_emails::Column::EmailAddress)
            .all(db_tx)
            .await?
            .into_iter()
            .map(|email| email.email_address)
            .collect();
        Ok(UserProfile {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            preferred_currency: preferred,
            emails: Some(emails),
        })
    }

    /// Update one's own profile.
    ///
    /// Changing the preferred currency rescales the rate of every currency
    /// the user owns by the old-to-new multiplier, then records the new
    /// preference, all inside one transaction. An unresolvable currency
    /// code skips the preference change but still applies the other
    /// fields.
    pub async fn update_user(
        &self,
        requestor: &str,
        username: &str,
        changes: UserChanges,
    ) -> ResultEngine<UserProfile> {
        if username != requestor {
            return Err(EngineError::Forbidden(
                "users can only update their own profile".to_string(),
            ));
        }
        let first_name = changes
            .first_name
            .as_deref()
            .map(|name| normalize_required_name(name, "first name", 50))
            .transpose()?;
        let last_name = changes
            .last_name
            .as_deref()
            .map(|name| normalize_required_name(name, "last name", 50))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let user = users::Entity::find_by_id(requestor)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
            let mut active: users::ActiveModel = user.clone().into();
            let mut dirty = false;

            if let Some(first_name) = first_name.clone() {
                active.first_name = ActiveValue::Set(first_name);
                dirty = true;
            }
            if let Some(last_name) = last_name.clone() {
                active.last_name = ActiveValue::Set(last_name);
                dirty = true;
            }

            if let Some(code) = changes.preferred_currency.as_deref() {
                match self.resolve_currency(&db_tx, requestor, code).await? {
                    None => {
                        // The rest of the update still applies; the stale
                        // preference keeps the owned rates consistent.
                        tracing::warn!(
                            code,
                            "preferred currency not found, keeping previous preference"
                        );
                    }
                    Some(new_preferred) if new_preferred.id != user.preferred_currency_id => {
                        let old_preferred =
                            currencies::Entity::find_by_id(user.preferred_currency_id)
                                .one(&db_tx)
                                .await?
                                .ok_or_else(|| EngineError::NotFound("currency".to_string()))?;
                        let multiplier = self
                            .rates()
                            .rate(&old_preferred.code, &new_preferred.code)
                            .ok_or_else(|| {
                                EngineError::BadRequest(format!(
                                    "no conversion rate from {} to {}",
                                    old_preferred.code, new_preferred.code
                                ))
                            })?;
                        self.rescale_owned_rates(&db_tx, requestor, multiplier)
                            .await?;
                        active.preferred_currency_id = ActiveValue::Set(new_preferred.id);
                        dirty = true;
                    }
                    Some(_) => {}
                }
            }

            if dirty {
                active.update(&db_tx).await?;
            }
            self.load_profile(&db_tx, requestor, requestor).await
        })
    }

    /// Search users by name substring, or by exact email address when the
    /// query contains an '@'.
    pub async fn search_users(
        &self,
        requestor: &str,
        query: &str,
    ) -> ResultEngine<Vec<UserProfile>> {
        with_tx!(self, |db_tx| {
            let rows = if query.contains('@') {
                user_emails::Entity::find()
                    .filter(user_emails::Column::EmailAddress.eq(query))
                    .find_also_related(users::Entity)
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .filter_map(|(_, user)| user)
                    .collect()
            } else {
                let pattern = format!("%{query}%");
                users::Entity::find()
                    .filter(users::Column::Username.ne(requestor))
                    .filter(
                        Condition::any()
                            .add(users::Column::Username.like(pattern.clone()))
                            .add(users::Column::FirstName.like(pattern.clone()))
                            .add(users::Column::LastName.like(pattern)),
                    )
                    .order_by_asc(users::Column::Username)
                    .all(&db_tx)
                    .await?
            };
            Ok(rows
                .into_iter()
                .map(|user| UserProfile {
                    username: user.username,
                    first_name: user.first_name,
                    last_name: user.last_name,
                    preferred_currency: None,
                    emails: None,
                })
                .collect())
        })
    }

    /// Rescale the rate of every currency owned by the user by
    /// `multiplier`. Shared currencies are never touched.
    async fn rescale_owned_rates(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        multiplier: Decimal,
    ) -> ResultEngine<()> {
        let owned = currencies::Entity::find()
            .filter(currencies::Column::OwnerUsername.eq(owner))
            .all(db_tx)
            .await?;
        for currency in owned {
            let rescaled = apply_rate(currency.rate, multiplier);
            let mut active: currencies::ActiveModel = currency.into();
            active.rate = ActiveValue::Set(rescaled);
            active.update(db_tx).await?;
        }
        Ok(())
    }
}
