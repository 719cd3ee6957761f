use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use nofeed_core::AppError;

use crate::modules::admin::model::{
    CreateUserDto, RoleUpdatedResponse, UpdateUserRoleDto, UserCreatedResponse,
    UserDeletedResponse, UserWithRole,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserWithRole>>, AppError> {
    let users = state.admin.list_users().await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), AppError> {
    state.admin.create_user(dto.auth0_user_id.trim()).await?;
    Ok((StatusCode::CREATED, Json(UserCreatedResponse { created: true })))
}

#[instrument(skip(state))]
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(auth0_user_id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateUserRoleDto>,
) -> Result<Json<RoleUpdatedResponse>, AppError> {
    state
        .admin
        .set_role(&auth0_user_id, dto.role.trim())
        .await?;
    Ok(Json(RoleUpdatedResponse { updated: true }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(auth0_user_id): Path<String>,
) -> Result<Json<UserDeletedResponse>, AppError> {
    state.admin.delete_user(&auth0_user_id).await?;
    Ok(Json(UserDeletedResponse { deleted: true }))
}
