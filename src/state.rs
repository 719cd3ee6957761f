use std::sync::Arc;

use nofeed_auth::{Auth0Client, OAuthError, TokenValidator};
use nofeed_config::{AppConfig, CookieConfig, CorsConfig, ServerConfig};
use nofeed_db::PgPool;

use crate::authz::RoleAuthorizer;
use crate::modules::admin::AdminService;
use crate::modules::posts::PostService;
use crate::store::{PgPostStore, PgUserStore, PostStore, UserStore};

/// Shared, cheaply cloneable handles every handler and middleware needs.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub admin: AdminService,
    pub authorizer: RoleAuthorizer,
    pub validator: Arc<TokenValidator>,
    pub auth0: Auth0Client,
    pub cookies: CookieConfig,
    pub cors: CorsConfig,
    pub server: ServerConfig,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        posts: Arc<dyn PostStore>,
        users: Arc<dyn UserStore>,
        validator: TokenValidator,
    ) -> Result<Self, OAuthError> {
        Ok(Self {
            posts: PostService::new(posts),
            admin: AdminService::new(users.clone()),
            authorizer: RoleAuthorizer::new(users),
            validator: Arc::new(validator),
            auth0: Auth0Client::new(config.auth0.clone())?,
            cookies: config.cookies.clone(),
            cors: config.cors.clone(),
            server: config.server.clone(),
        })
    }

    /// Production wiring: Postgres stores and a JWKS-backed validator.
    pub fn from_pool(config: &AppConfig, pool: PgPool) -> anyhow::Result<Self> {
        let validator = TokenValidator::from_config(&config.auth0)?;
        let state = Self::new(
            config,
            Arc::new(PgPostStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool)),
            validator,
        )?;
        Ok(state)
    }
}
