//! Authentication view of the users table, plus the user profile
//! endpoints.
//!
//! Users are provisioned out of band; the API can only read and update
//! them, never list, create or delete.

use api_types::user::{UserSearchResponse, UserUpdate, UserView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{EngineError, UserChanges, UserProfile};
use sea_orm::entity::prelude::*;

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn map_profile(profile: UserProfile) -> UserView {
    UserView {
        username: profile.username,
        first_name: profile.first_name,
        last_name: profile.last_name,
        preferred_currency: profile.preferred_currency,
        emails: profile.emails,
    }
}

pub async fn read(
    Extension(user): Extension<Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    let profile = state.engine.user(&user.username, &username).await?;
    Ok(Json(map_profile(profile)))
}

pub async fn update(
    Extension(user): Extension<Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let profile = state
        .engine
        .update_user(
            &user.username,
            &username,
            UserChanges {
                first_name: payload.first_name,
                last_name: payload.last_name,
                preferred_currency: payload.preferred_currency,
            },
        )
        .await?;
    Ok(Json(map_profile(profile)))
}

pub async fn search(
    Extension(user): Extension<Model>,
    State(state): State<ServerState>,
    Path(query): Path<String>,
) -> Result<Json<UserSearchResponse>, ServerError> {
    let users = state
        .engine
        .search_users(&user.username, &query)
        .await?
        .into_iter()
        .map(map_profile)
        .collect();
    Ok(Json(UserSearchResponse { users }))
}

pub async fn list_forbidden() -> Result<StatusCode, ServerError> {
    Err(ServerError::Engine(EngineError::Forbidden(
        "users cannot be listed".to_string(),
    )))
}

pub async fn create_forbidden() -> Result<StatusCode, ServerError> {
    Err(ServerError::Engine(EngineError::Forbidden(
        "users cannot be created".to_string(),
    )))
}

pub async fn delete_forbidden(Path(_username): Path<String>) -> Result<StatusCode, ServerError> {
    Err(ServerError::Engine(EngineError::Forbidden(
        "users cannot be deleted".to_string(),
    )))
}
