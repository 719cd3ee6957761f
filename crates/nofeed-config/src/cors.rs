use crate::source::optional;

const PRODUCTION_ORIGIN: &str = "https://nofeed.zone";
const DEVELOPMENT_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self::from_source(&crate::source::env_lookup)
    }

    pub fn from_source<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(origins) = optional(lookup, "ALLOWED_ORIGINS") {
            return Self {
                allowed_origins: origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            };
        }

        let mut allowed_origins = vec![PRODUCTION_ORIGIN.to_string()];
        if optional(lookup, "ENVIRONMENT").as_deref() == Some("development") {
            allowed_origins.push(DEVELOPMENT_ORIGIN.to_string());
        }

        Self { allowed_origins }
    }
}
