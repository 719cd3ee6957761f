//! Attributes applied to the `access_token` and `refresh_token` cookies.
//!
//! - `AUTH0_COOKIE_DOMAIN`: cookie domain, host-only when unset
//! - `AUTH0_COOKIE_SECURE`: `true`/`1` or `false`/`0` (default true)
//! - `AUTH0_COOKIE_SAMESITE`: `lax` (default), `strict` or `none`

use crate::ConfigError;
use crate::source::optional;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SameSitePolicy {
    #[default]
    Lax,
    Strict,
    None,
}

#[derive(Clone, Debug)]
pub struct CookieConfig {
    pub domain: Option<String>,
    pub secure: bool,
    pub same_site: SameSitePolicy,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            domain: None,
            secure: true,
            same_site: SameSitePolicy::Lax,
        }
    }
}

impl CookieConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&crate::source::env_lookup)
    }

    pub fn from_source<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secure = match optional(lookup, "AUTH0_COOKIE_SECURE") {
            None => true,
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "AUTH0_COOKIE_SECURE",
                        value: v,
                        reason: "expected true, false, 1 or 0",
                    });
                }
            },
        };

        let same_site = match optional(lookup, "AUTH0_COOKIE_SAMESITE") {
            None => SameSitePolicy::Lax,
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "lax" => SameSitePolicy::Lax,
                "strict" => SameSitePolicy::Strict,
                "none" => SameSitePolicy::None,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "AUTH0_COOKIE_SAMESITE",
                        value: v,
                        reason: "expected lax, strict or none",
                    });
                }
            },
        };

        // Browsers drop SameSite=None cookies that are not also Secure.
        if same_site == SameSitePolicy::None && !secure {
            return Err(ConfigError::Invalid {
                key: "AUTH0_COOKIE_SAMESITE",
                value: "none".to_string(),
                reason: "SameSite=None requires AUTH0_COOKIE_SECURE=true",
            });
        }

        Ok(Self {
            domain: optional(lookup, "AUTH0_COOKIE_DOMAIN"),
            secure,
            same_site,
        })
    }
}
