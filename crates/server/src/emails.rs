//! Email address API endpoints.

use api_types::email::{EmailCreate, EmailListResponse, EmailUpdate};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<EmailListResponse>, ServerError> {
    let emails = state.engine.list_emails(&user.username).await?;
    Ok(Json(EmailListResponse { emails }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EmailCreate>,
) -> Result<(StatusCode, Json<String>), ServerError> {
    let address = state
        .engine
        .create_email(&user.username, &payload.email_address)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(address): Path<String>,
    Json(payload): Json<EmailUpdate>,
) -> Result<Json<String>, ServerError> {
    let address = state
        .engine
        .update_email(&user.username, &address, &payload.email_address)
        .await?;
    Ok(Json(address))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(address): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_email(&user.username, &address).await?;
    Ok(StatusCode::NO_CONTENT)
}
