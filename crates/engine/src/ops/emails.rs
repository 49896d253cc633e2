use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, user_emails};

use super::{Engine, with_tx};

fn normalize_address(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(EngineError::BadRequest(
            "invalid email address".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl Engine {
    /// Email addresses registered by the user, ordered.
    pub async fn list_emails(&self, owner: &str) -> ResultEngine<Vec<String>> {
        with_tx!(self, |db_tx| {
            let rows = user_emails::Entity::find()
                .filter(user_emails::Column::UserUsername.eq(owner))
                .order_by_asc(user_emails::Column::EmailAddress)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(|row| row.email_address).collect())
        })
    }

    pub async fn create_email(&self, owner: &str, address: &str) -> ResultEngine<String> {
        let address = normalize_address(address)?;
        with_tx!(self, |db_tx| {
            let exists = user_emails::Entity::find_by_id((owner.to_string(), address.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::BadRequest(
                    "email address already registered".to_string(),
                ));
            }
            user_emails::ActiveModel {
                user_username: ActiveValue::Set(owner.to_string()),
                email_address: ActiveValue::Set(address.clone()),
            }
            .insert(&db_tx)
            .await?;
            Ok(address)
        })
    }

    /// Replace one registered address with another.
    pub async fn update_email(
        &self,
        owner: &str,
        address: &str,
        new_address: &str,
    ) -> ResultEngine<String> {
        let new_address = normalize_address(new_address)?;
        with_tx!(self, |db_tx| {
            let existing = user_emails::Entity::find_by_id((owner.to_string(), address.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("email address".to_string()))?;
            if existing.email_address == new_address {
                return Ok(new_address.clone());
            }
            let duplicate =
                user_emails::Entity::find_by_id((owner.to_string(), new_address.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
            if duplicate {
                return Err(EngineError::BadRequest(
                    "email address already registered".to_string(),
                ));
            }
            // The address is part of the primary key, so the rename is a
            // delete plus insert within the transaction.
            user_emails::Entity::delete_by_id((owner.to_string(), address.to_string()))
                .exec(&db_tx)
                .await?;
            user_emails::ActiveModel {
                user_username: ActiveValue::Set(owner.to_string()),
                email_address: ActiveValue::Set(new_address.clone()),
            }
            .insert(&db_tx)
            .await?;
            Ok(new_address.clone())
        })
    }

    pub async fn delete_email(&self, owner: &str, address: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            user_emails::Entity::find_by_id((owner.to_string(), address.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("email address".to_string()))?;
            user_emails::Entity::delete_by_id((owner.to_string(), address.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
