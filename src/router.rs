use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::logging::logging_middleware;
use crate::middleware::auth::require_auth;
use crate::middleware::role::{ensure_member, require_superadmin};
use crate::modules::admin::router::init_admin_router;
use crate::modules::auth::controller::me;
use crate::modules::auth::router::init_auth_router;
use crate::modules::health::router::init_health_router;
use crate::modules::posts::router::{init_member_posts_router, init_public_posts_router};
use crate::state::AppState;

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(init_health_router())
                .merge(init_auth_router())
                .merge(
                    Router::new()
                        .route("/me", get(me))
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
                )
                .nest(
                    "/posts",
                    init_public_posts_router().merge(
                        init_member_posts_router()
                            .route_layer(middleware::from_fn_with_state(
                                state.clone(),
                                ensure_member,
                            ))
                            .route_layer(middleware::from_fn_with_state(
                                state.clone(),
                                require_auth,
                            )),
                    ),
                )
                .nest(
                    "/admin",
                    init_admin_router()
                        .route_layer(middleware::from_fn_with_state(
                            state.clone(),
                            require_superadmin,
                        ))
                        .route_layer(middleware::from_fn_with_state(state.clone(), ensure_member))
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
                ),
        )
        .with_state(state.clone())
        .layer(TimeoutLayer::new(state.server.request_timeout))
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(CORS_MAX_AGE)
        })
        .layer(middleware::from_fn(logging_middleware))
}
