use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{create_post, delete_post, get_post, list_posts, update_post};

/// Read-only routes, open to anonymous callers.
pub fn init_public_posts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/{id}", get(get_post))
}

/// Mutating routes. The caller must attach authentication and membership
/// layers.
pub fn init_member_posts_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
}
