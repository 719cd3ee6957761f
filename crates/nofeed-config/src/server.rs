use std::time::Duration;

use crate::ConfigError;
use crate::source::{number_or, optional};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Reported by the health check.
    pub version: String,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&crate::source::env_lookup)
    }

    pub fn from_source<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            bind_addr: optional(lookup, "BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            version: optional(lookup, "VERSION").unwrap_or_default(),
            request_timeout: Duration::from_secs(number_or(lookup, "REQUEST_TIMEOUT_SECS", 30)?),
        })
    }
}
