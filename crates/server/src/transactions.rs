//! Transaction API endpoints.

use api_types::transaction::{
    AccountSplit, CategorySplit, TransactionCreate, TransactionListResponse, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{TransactionDetail, TransactionInput};

use crate::{ServerError, server::ServerState, user};

fn map_transaction(detail: TransactionDetail) -> TransactionView {
    TransactionView {
        id: detail.id,
        description: detail.description,
        original_description: detail.original_description,
        amount: detail.amount,
        currency: detail.currency,
        date: detail.date,
        accounts: detail
            .accounts
            .into_iter()
            .map(|split| AccountSplit {
                account_id: split.account_id,
                amount: split.amount,
                verified: split.verified,
            })
            .collect(),
        categories: detail
            .categories
            .into_iter()
            .map(|split| CategorySplit {
                category_id: split.category_id,
                amount: split.amount,
            })
            .collect(),
    }
}

fn transaction_input(payload: TransactionCreate) -> TransactionInput {
    TransactionInput {
        description: payload.description,
        original_description: payload.original_description,
        amount: payload.amount,
        currency: payload.currency,
        date: payload.date,
        accounts: payload
            .accounts
            .into_iter()
            .map(|split| engine::AccountSplit {
                account_id: split.account_id,
                amount: split.amount,
                verified: split.verified,
            })
            .collect(),
        categories: payload
            .categories
            .into_iter()
            .map(|split| engine::CategorySplit {
                category_id: split.category_id,
                amount: split.amount,
            })
            .collect(),
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .transactions(&user.username)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();
    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionCreate>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let transaction = state
        .engine
        .create_transaction(&user.username, transaction_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(map_transaction(transaction))))
}

pub async fn read(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionView>, ServerError> {
    let transaction = state.engine.transaction(&user.username, id).await?;
    Ok(Json(map_transaction(transaction)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
