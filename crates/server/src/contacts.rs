//! Contact API endpoints. A contact is only a link to another user.

use api_types::contact::{ContactCreate, ContactListResponse};
use api_types::user::UserView;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ContactListResponse>, ServerError> {
    let contacts = state
        .engine
        .list_contacts(&user.username)
        .await?
        .into_iter()
        .map(user::map_profile)
        .collect();
    Ok(Json(ContactListResponse { contacts }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ContactCreate>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let contact = state
        .engine
        .create_contact(&user.username, &payload.username)
        .await?;
    Ok((StatusCode::CREATED, Json(user::map_profile(contact))))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_contact(&user.username, &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
