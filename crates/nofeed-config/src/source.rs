use std::env;

use crate::ConfigError;

pub(crate) fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Reads a variable, treating blank values as unset.
pub(crate) fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

/// Parses a positive number, using `default` when unset. A value that is set
/// but not a positive number is an error.
pub(crate) fn number_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = optional(lookup, key) else {
        return Ok(default);
    };
    match raw.parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a positive number",
        }),
    }
}
