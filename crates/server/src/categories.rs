//! Category API endpoints.

use api_types::category::{
    CategoryCreate, CategoryListResponse, CategoryUpdate, CategoryView, ParentField,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CategoryChanges, CategoryTree, ParentUpdate};

use crate::{ServerError, server::ServerState, user};

fn map_category(tree: CategoryTree) -> CategoryView {
    CategoryView {
        id: tree.id,
        name: tree.name,
        currency: tree.currency,
        parent: tree.parent_id,
        children: tree.children.into_iter().map(map_category).collect(),
    }
}

fn parent_update(field: ParentField) -> Result<ParentUpdate, ServerError> {
    match field {
        ParentField::Id(id) => Ok(ParentUpdate::To(id)),
        ParentField::Sentinel(value) if value.eq_ignore_ascii_case("none") => {
            Ok(ParentUpdate::Detach)
        }
        ParentField::Sentinel(other) => Err(ServerError::Generic(format!(
            "invalid parent value: {other}"
        ))),
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories(&user.username)
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(CategoryListResponse { categories }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            &user.username,
            &payload.name,
            &payload.currency,
            payload.parent,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn read(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(&user.username, id).await?;
    Ok(Json(map_category(category)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    if payload.name.is_none() && payload.currency.is_none() && payload.parent.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name, currency or parent".to_string(),
        ));
    }

    let parent = payload.parent.map(parent_update).transpose()?;
    let category = state
        .engine
        .update_category(
            &user.username,
            id,
            CategoryChanges {
                name: payload.name,
                currency: payload.currency,
                parent,
            },
        )
        .await?;
    Ok(Json(map_category(category)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
