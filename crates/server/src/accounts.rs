//! Account API endpoints.

use api_types::account::{AccountCreate, AccountListResponse, AccountUpdate, AccountView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{AccountChanges, AccountInfo};

use crate::{ServerError, server::ServerState, user};

fn map_account(info: AccountInfo) -> AccountView {
    AccountView {
        id: info.id,
        name: info.name,
        currency: info.currency,
        start_balance: info.start_balance,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let accounts = state
        .engine
        .list_accounts(&user.username)
        .await?
        .into_iter()
        .map(map_account)
        .collect();
    Ok(Json(AccountListResponse { accounts }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountCreate>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .create_account(
            &user.username,
            &payload.name,
            &payload.currency,
            payload.start_balance,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_account(account))))
}

pub async fn read(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(&user.username, id).await?;
    Ok(Json(map_account(account)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    if payload.name.is_none() && payload.start_balance.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or start_balance".to_string(),
        ));
    }
    let account = state
        .engine
        .update_account(
            &user.username,
            id,
            AccountChanges {
                name: payload.name,
                start_balance: payload.start_balance,
            },
        )
        .await?;
    Ok(Json(map_account(account)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
