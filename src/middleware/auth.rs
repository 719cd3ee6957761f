use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use nofeed_auth::{AuthError, Principal, extract_token};
use nofeed_core::AppError;

use crate::state::AppState;

/// The validated identity of the caller.
///
/// Only present on routes behind [`require_auth`]; extracting it anywhere
/// else is a 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    pub fn subject(&self) -> &str {
        &self.0.subject
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(anyhow!("Unauthorized")))
    }
}

/// Validates the bearer token and attaches the principal to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers()).ok_or(AuthError::MissingToken)?;
    let principal = state.validator.validate(&token).await?;

    req.extensions_mut().insert(AuthUser(principal));
    Ok(next.run(req).await)
}

/// Reads the principal set by [`require_auth`] from a request.
pub(crate) fn current_user(req: &Request) -> Result<&AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::unauthorized(anyhow!("Unauthorized")))
}
