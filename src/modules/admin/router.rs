use axum::{
    Router,
    routing::{delete, get, patch},
};

use crate::state::AppState;

use super::controller::{create_user, delete_user, list_users, update_user_role};

pub fn init_admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/role", patch(update_user_role))
}
