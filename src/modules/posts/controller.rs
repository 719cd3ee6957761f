use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use nofeed_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::modules::posts::model::{CreatePostDto, Post, PostFilterParams, UpdatePostDto};
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Ids that are not UUIDs cannot name a post, so they are simply not found.
fn parse_post_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::not_found(anyhow!("Post not found")))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(filters): Query<PostFilterParams>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.posts.list_posts(filters).await?;
    Ok(Json(posts))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let post = state.posts.get_post(parse_post_id(&id)?).await?;
    Ok(Json(post))
}

#[instrument(skip(state, auth_user, dto), fields(subject = %auth_user.subject()))]
pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreatePostDto>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = state.posts.create_post(auth_user.subject(), dto).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[instrument(skip(state, auth_user, dto), fields(subject = %auth_user.subject()))]
pub async fn update_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdatePostDto>,
) -> Result<Json<Post>, AppError> {
    let post = state
        .posts
        .update_post(auth_user.subject(), parse_post_id(&id)?, dto)
        .await?;
    Ok(Json(post))
}

#[instrument(skip(state, auth_user), fields(subject = %auth_user.subject()))]
pub async fn delete_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .posts
        .delete_post(auth_user.subject(), parse_post_id(&id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
