//! # nofeed Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`auth0`]: identity provider, token validation and login flow settings
//! - [`cookie`]: attributes of the token cookies
//! - [`cors`]: allowed browser origins
//! - [`database`]: where the Postgres credentials come from
//! - [`server`]: bind address, version and request deadline
//!
//! Every struct has a `from_env()` constructor and a `from_source()` variant
//! that takes a lookup function, so tests never touch the process
//! environment. Missing required values are reported as [`ConfigError`] and
//! abort startup; the service never runs with partial configuration.
//!
//! # Example
//!
//! ```ignore
//! use nofeed_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! println!("issuer: {}", config.auth0.issuer());
//! ```

pub mod auth0;
pub mod cookie;
pub mod cors;
pub mod database;
pub mod server;
mod source;

pub use auth0::Auth0Config;
pub use cookie::{CookieConfig, SameSitePolicy};
pub use cors::CorsConfig;
pub use database::{DatabaseConfig, DatabaseSource};
pub use server::ServerConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("either DATABASE_URL or DB_SECRET_ARN must be set")]
    NoDatabaseSource,
}

/// All configuration the server needs, resolved once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub auth0: Auth0Config,
    pub cookies: CookieConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(source::env_lookup)
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            auth0: Auth0Config::from_source(&lookup)?,
            cookies: CookieConfig::from_source(&lookup)?,
            cors: CorsConfig::from_source(&lookup),
            database: DatabaseConfig::from_source(&lookup)?,
            server: ServerConfig::from_source(&lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_full_config_loads() {
        let config = AppConfig::from_source(lookup(&[
            ("AUTH0_DOMAIN", "tenant.us.auth0.com"),
            ("AUTH0_AUDIENCE", "https://api.nofeed.zone"),
            ("AUTH0_CLIENT_ID", "client"),
            ("AUTH0_CLIENT_SECRET", "secret"),
            ("AUTH0_CALLBACK_URL", "https://api.nofeed.zone/api/callback"),
            ("DATABASE_URL", "postgres://localhost/nofeed"),
        ]))
        .unwrap();

        assert_eq!(config.auth0.issuer(), "https://tenant.us.auth0.com/");
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert!(config.cookies.secure);
    }

    #[test]
    fn test_missing_audience_is_fatal() {
        let err = AppConfig::from_source(lookup(&[
            ("AUTH0_DOMAIN", "tenant.us.auth0.com"),
            ("DATABASE_URL", "postgres://localhost/nofeed"),
        ]))
        .unwrap_err();

        assert_eq!(err, ConfigError::Missing("AUTH0_AUDIENCE"));
    }
}
