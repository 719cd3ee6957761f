//! Database connection settings.
//!
//! Either `DATABASE_URL` (local development, tests) or `DB_SECRET_ARN`
//! (deployed; credentials resolved from the secrets store at startup) must be
//! set. When both are present the explicit URL wins.

use std::time::Duration;

use crate::ConfigError;
use crate::source::{number_or, optional};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseSource {
    Url(String),
    Secret(String),
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub source: DatabaseSource,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    /// Statement timeout applied while migrations run.
    pub migration_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&crate::source::env_lookup)
    }

    pub fn from_source<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = match (
            optional(lookup, "DATABASE_URL"),
            optional(lookup, "DB_SECRET_ARN"),
        ) {
            (Some(url), _) => DatabaseSource::Url(url),
            (None, Some(arn)) => DatabaseSource::Secret(arn),
            (None, None) => return Err(ConfigError::NoDatabaseSource),
        };

        Ok(Self {
            source,
            max_connections: number_or(lookup, "DB_MAX_CONNECTIONS", 10)?,
            connect_timeout: Duration::from_secs(10),
            migration_timeout: Duration::from_millis(number_or(
                lookup,
                "MIGRATION_TIMEOUT_MS",
                30_000,
            )?),
        })
    }
}
