use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{callback, login, logout, refresh};

/// Login flow routes. None of them require a valid access token.
pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/refresh", post(refresh))
        .route("/logout", get(logout))
}
