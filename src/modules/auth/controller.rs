use anyhow::anyhow;
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use nofeed_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::{CallbackParams, MeResponse, RefreshResponse};
use crate::modules::auth::service::{
    clear_session, new_login_state, refresh_token, state_cookie, store_tokens, take_login_state,
};
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let login_state = new_login_state();
    let url = state.auth0.authorize_url(&login_state)?;

    Ok((
        jar.add(state_cookie(&state.cookies, login_state)),
        Redirect::temporary(url.as_str()),
    ))
}

/// Rejections still carry the jar, so the one-shot `auth_state` cookie is
/// cleared whatever the outcome.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let (jar, expected_state) = take_login_state(jar, &state.cookies);

    if let Some(error) = params.error {
        let description = params.error_description.unwrap_or_else(|| error.clone());
        warn!(error = %error, description = %description, "authorization failed at provider");
        let err = AppError::bad_request(anyhow!("Authorization failed: {}", description));
        return (jar, err).into_response();
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        let err = AppError::bad_request(anyhow!("Missing authorization code"));
        return (jar, err).into_response();
    };

    match (params.state.as_deref(), expected_state.as_deref()) {
        (Some(got), Some(expected)) if got == expected => {}
        _ => {
            warn!("login state mismatch");
            let err = AppError::bad_request(anyhow!("Invalid login state"));
            return (jar, err).into_response();
        }
    }

    let tokens = match state.auth0.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => return (jar, AppError::from(e)).into_response(),
    };
    info!("login completed");

    (
        store_tokens(jar, &state.cookies, &tokens),
        Redirect::temporary(&state.auth0.config().post_login_url),
    )
        .into_response()
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let token = refresh_token(&jar)
        .ok_or_else(|| AppError::unauthorized(anyhow!("missing refresh token")))?;

    let tokens = state.auth0.refresh(&token).await?;

    Ok((
        store_tokens(jar, &state.cookies, &tokens),
        [(header::CACHE_CONTROL, "no-store")],
        Json(RefreshResponse { refreshed: true }),
    ))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let url = state.auth0.logout_url()?;
    Ok((
        clear_session(jar, &state.cookies),
        Redirect::temporary(url.as_str()),
    ))
}

#[instrument(skip_all, fields(subject = %auth_user.subject()))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        authenticated: true,
        user_id: auth_user.subject().to_string(),
        message: "You are authenticated".to_string(),
    })
}
