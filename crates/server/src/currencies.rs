//! Currency API endpoints.

use api_types::currency::{
    CurrencyCreate, CurrencyListResponse, CurrencyUpdate, CurrencyView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CurrencyChanges, CurrencyInfo};

use crate::{ServerError, server::ServerState, user};

fn map_currency(info: CurrencyInfo) -> CurrencyView {
    CurrencyView {
        id: info.id,
        code: info.code,
        name: info.name,
        owner: info.owner,
        rate: info.rate,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CurrencyListResponse>, ServerError> {
    let currencies = state
        .engine
        .list_currencies(&user.username)
        .await?
        .into_iter()
        .map(map_currency)
        .collect();
    Ok(Json(CurrencyListResponse { currencies }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CurrencyCreate>,
) -> Result<(StatusCode, Json<CurrencyView>), ServerError> {
    let currency = state
        .engine
        .create_currency(&user.username, &payload.code, &payload.name, payload.rate)
        .await?;
    Ok((StatusCode::CREATED, Json(map_currency(currency))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CurrencyUpdate>,
) -> Result<Json<CurrencyView>, ServerError> {
    if payload.name.is_none() && payload.rate.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or rate".to_string(),
        ));
    }
    let currency = state
        .engine
        .update_currency(
            &user.username,
            id,
            CurrencyChanges {
                name: payload.name,
                rate: payload.rate,
            },
        )
        .await?;
    Ok(Json(map_currency(currency)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_currency(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
