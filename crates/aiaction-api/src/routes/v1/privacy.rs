use aiaction::privacy::{DataField, DataTable};
use aiaction::{ContextId, UserId};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{ApiResult, AppState};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DataFieldDto {
    pub name: String,
    pub description: String,
}

impl From<DataField> for DataFieldDto {
    fn from(field: DataField) -> Self {
        Self {
            name: field.name,
            description: field.description,
        }
    }
}

/// A table holding user data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DataTableDto {
    pub name: String,
    pub description: String,
    pub fields: Vec<DataFieldDto>,
}

impl From<DataTable> for DataTableDto {
    fn from(table: DataTable) -> Self {
        Self {
            name: table.name,
            description: table.description,
            fields: table.fields.into_iter().map(DataFieldDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContextsResponse {
    pub user_id: i64,
    pub context_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsersResponse {
    pub context_id: i64,
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub user_id: i64,
    /// Rows removed across the action and policy registers
    pub deleted: u64,
}

/// Tables and columns that store user data
#[utoipa::path(
    get,
    path = "/api/v1/privacy/metadata",
    responses(
        (status = 200, description = "Stored user data", body = Vec<DataTableDto>)
    ),
    tag = "privacy"
)]
pub async fn get_metadata(State(state): State<AppState>) -> Json<Vec<DataTableDto>> {
    Json(
        state
            .app
            .privacy()
            .metadata()
            .into_iter()
            .map(DataTableDto::from)
            .collect(),
    )
}

/// Contexts holding data of a user
#[utoipa::path(
    get,
    path = "/api/v1/privacy/users/{user_id}/contexts",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Context ids", body = ContextsResponse)
    ),
    tag = "privacy"
)]
pub async fn contexts_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<ContextsResponse>> {
    let contexts = state
        .app
        .privacy()
        .contexts_for_user(UserId::new(user_id))
        .await?;

    Ok(Json(ContextsResponse {
        user_id,
        context_ids: contexts.into_iter().map(|c| c.get()).collect(),
    }))
}

/// Users with data in a context
#[utoipa::path(
    get,
    path = "/api/v1/privacy/contexts/{context_id}/users",
    params(
        ("context_id" = i64, Path, description = "Context ID")
    ),
    responses(
        (status = 200, description = "User ids", body = UsersResponse)
    ),
    tag = "privacy"
)]
pub async fn users_in_context(
    State(state): State<AppState>,
    Path(context_id): Path<i64>,
) -> ApiResult<Json<UsersResponse>> {
    let users = state
        .app
        .privacy()
        .users_in_context(ContextId::new(context_id))
        .await?;

    Ok(Json(UsersResponse {
        context_id,
        user_ids: users.into_iter().map(|u| u.get()).collect(),
    }))
}

/// Erase all AI data of a user
#[utoipa::path(
    delete,
    path = "/api/v1/privacy/users/{user_id}",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Data erased", body = DeleteResponse)
    ),
    tag = "privacy"
)]
pub async fn delete_user_data(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state
        .app
        .privacy()
        .delete_data_for_user(UserId::new(user_id))
        .await?;

    Ok(Json(DeleteResponse { user_id, deleted }))
}

pub fn routes() -> axum::Router<AppState> {
    use axum::routing::{delete, get};

    axum::Router::new()
        .route("/metadata", get(get_metadata))
        .route("/users/{user_id}", delete(delete_user_data))
        .route("/users/{user_id}/contexts", get(contexts_for_user))
        .route("/contexts/{context_id}/users", get(users_in_context))
}
