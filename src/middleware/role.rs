//! Role middleware for use with `axum::middleware::from_fn_with_state`.

use anyhow::anyhow;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use nofeed_core::{AppError, roles};

use crate::middleware::auth::current_user;
use crate::state::AppState;

/// Provisions the caller as a local user holding the default role, unless
/// they already hold a role. Never denies.
pub async fn ensure_member(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = current_user(&req)?.clone();
    state
        .authorizer
        .ensure_default_role(&user.0, roles::DEFAULT)
        .await?;

    Ok(next.run(req).await)
}

pub async fn require_superadmin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(state, req, next, roles::SUPERADMIN).await
}

async fn require_role(
    state: AppState,
    req: Request,
    next: Next,
    role: &'static str,
) -> Result<Response, AppError> {
    let user = current_user(&req)?.clone();

    if !state.authorizer.require_role(&user.0, role).await? {
        warn!(subject = %user.subject(), required = role, "role check failed");
        return Err(AppError::forbidden(anyhow!(
            "Access denied. Required role: {}",
            role
        )));
    }

    Ok(next.run(req).await)
}
