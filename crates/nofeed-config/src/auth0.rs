//! Identity provider configuration.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `AUTH0_DOMAIN` | yes | |
//! | `AUTH0_AUDIENCE` | yes | |
//! | `AUTH0_CLIENT_ID` | yes | |
//! | `AUTH0_CLIENT_SECRET` | yes | |
//! | `AUTH0_CALLBACK_URL` | yes | |
//! | `AUTH0_LOGOUT_RETURN_URL` | no | post-login URL |
//! | `AUTH0_POST_LOGIN_URL` | no | `https://nofeed.zone` |
//! | `AUTH0_SCHEME` | no | `https` |
//! | `JWKS_CACHE_TTL_SECS` | no | `300` |

use std::time::Duration;

use crate::ConfigError;
use crate::source::{number_or, optional, required};

const DEFAULT_POST_LOGIN_URL: &str = "https://nofeed.zone";
const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct Auth0Config {
    pub domain: String,
    pub audience: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub logout_return_url: String,
    pub post_login_url: String,
    /// Scheme used to reach the tenant's endpoints. Only tests point this at
    /// plain `http`.
    pub scheme: String,
    pub jwks_cache_ttl: Duration,
}

impl Auth0Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&crate::source::env_lookup)
    }

    pub fn from_source<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domain = required(lookup, "AUTH0_DOMAIN")?;
        if domain.contains("://") || domain.contains('/') {
            return Err(ConfigError::Invalid {
                key: "AUTH0_DOMAIN",
                value: domain,
                reason: "expected a bare host name",
            });
        }

        let scheme = optional(lookup, "AUTH0_SCHEME").unwrap_or_else(|| "https".to_string());
        if scheme != "https" && scheme != "http" {
            return Err(ConfigError::Invalid {
                key: "AUTH0_SCHEME",
                value: scheme,
                reason: "expected http or https",
            });
        }

        let post_login_url = optional(lookup, "AUTH0_POST_LOGIN_URL")
            .unwrap_or_else(|| DEFAULT_POST_LOGIN_URL.to_string());

        Ok(Self {
            audience: required(lookup, "AUTH0_AUDIENCE")?,
            client_id: required(lookup, "AUTH0_CLIENT_ID")?,
            client_secret: required(lookup, "AUTH0_CLIENT_SECRET")?,
            callback_url: required(lookup, "AUTH0_CALLBACK_URL")?,
            logout_return_url: optional(lookup, "AUTH0_LOGOUT_RETURN_URL")
                .unwrap_or_else(|| post_login_url.clone()),
            post_login_url,
            jwks_cache_ttl: Duration::from_secs(number_or(
                lookup,
                "JWKS_CACHE_TTL_SECS",
                DEFAULT_JWKS_CACHE_TTL_SECS,
            )?),
            domain,
            scheme,
        })
    }

    /// Expected `iss` claim. Auth0 always issues with a trailing slash.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.domain)
    }

    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.base_url())
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.base_url())
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url())
    }

    pub fn logout_url(&self) -> String {
        format!("{}/v2/logout", self.base_url())
    }
}
