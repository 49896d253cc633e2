use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, user_contacts, users};

use super::users::UserProfile;
use super::{Engine, with_tx};

impl Engine {
    /// The user's contacts, as bare profiles of the linked users.
    pub async fn list_contacts(&self, owner: &str) -> ResultEngine<Vec<UserProfile>> {
        with_tx!(self, |db_tx| {
            let rows = user_contacts::Entity::find()
                .filter(user_contacts::Column::UserUsername.eq(owner))
                .order_by_asc(user_contacts::Column::ContactUsername)
                .find_also_related(users::Entity)
                .all(&db_tx)
                .await?;
            Ok(rows
                .into_iter()
                .filter_map(|(_, user)| user)
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

    /// Link another user as a contact.
    pub async fn create_contact(&self, owner: &str, username: &str) -> ResultEngine<UserProfile> {
        with_tx!(self, |db_tx| {
            let contact = users::Entity::find_by_id(username)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
            let exists =
                user_contacts::Entity::find_by_id((owner.to_string(), username.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
            if exists {
                return Err(EngineError::BadRequest(
                    "contact already exists".to_string(),
                ));
            }
            user_contacts::ActiveModel {
                user_username: ActiveValue::Set(owner.to_string()),
                contact_username: ActiveValue::Set(username.to_string()),
            }
            .insert(&db_tx)
            .await?;
            Ok(UserProfile {
                username: contact.username,
                first_name: contact.first_name,
                last_name: contact.last_name,
                preferred_currency: None,
                emails: None,
            })
        })
    }

    pub async fn delete_contact(&self, owner: &str, username: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            user_contacts::Entity::find_by_id((owner.to_string(), username.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("contact".to_string()))?;
            user_contacts::Entity::delete_by_id((owner.to_string(), username.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
