//! Cookie handling for the login flow.
//!
//! Tokens never reach JavaScript: every cookie is HttpOnly on path `/`, with
//! the configured domain, `Secure` flag and SameSite policy.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use uuid::Uuid;

use nofeed_auth::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, TokenResponse};
use nofeed_config::{CookieConfig, SameSitePolicy};

/// Holds the `state` parameter between `/login` and `/callback`.
pub const AUTH_STATE_COOKIE: &str = "auth_state";

const REFRESH_TOKEN_MAX_AGE: Duration = Duration::days(30);
const AUTH_STATE_MAX_AGE: Duration = Duration::minutes(10);

fn same_site(policy: SameSitePolicy) -> SameSite {
    match policy {
        SameSitePolicy::Lax => SameSite::Lax,
        SameSitePolicy::Strict => SameSite::Strict,
        SameSitePolicy::None => SameSite::None,
    }
}

fn cookie(
    config: &CookieConfig,
    name: &'static str,
    value: String,
    same_site_policy: SameSite,
    max_age: Option<Duration>,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(same_site_policy);

    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(max_age) = max_age {
        builder = builder.max_age(max_age);
    }
    builder.build()
}

fn removal(config: &CookieConfig, name: &'static str) -> Cookie<'static> {
    let mut builder = Cookie::build(name).path("/");
    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// A fresh, unguessable value for the OAuth `state` parameter.
pub fn new_login_state() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The state cookie is always `Lax`: it has to survive the top-level
/// redirect back from the identity provider.
pub fn state_cookie(config: &CookieConfig, state: String) -> Cookie<'static> {
    cookie(
        config,
        AUTH_STATE_COOKIE,
        state,
        SameSite::Lax,
        Some(AUTH_STATE_MAX_AGE),
    )
}

pub fn take_login_state(jar: CookieJar, config: &CookieConfig) -> (CookieJar, Option<String>) {
    let state = jar
        .get(AUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    (jar.remove(removal(config, AUTH_STATE_COOKIE)), state)
}

/// Sets the access cookie for the token's lifetime and, when the provider
/// issued one, the refresh cookie for 30 days.
pub fn store_tokens(jar: CookieJar, config: &CookieConfig, tokens: &TokenResponse) -> CookieJar {
    let policy = same_site(config.same_site);
    let access = cookie(
        config,
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        policy,
        tokens
            .expires_in
            .filter(|secs| *secs > 0)
            .map(Duration::seconds),
    );
    let jar = jar.add(access);

    match tokens.refresh_token.as_deref().filter(|t| !t.is_empty()) {
        Some(refresh) => jar.add(cookie(
            config,
            REFRESH_TOKEN_COOKIE,
            refresh.to_string(),
            policy,
            Some(REFRESH_TOKEN_MAX_AGE),
        )),
        None => jar,
    }
}

pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub fn clear_session(jar: CookieJar, config: &CookieConfig) -> CookieJar {
    jar.remove(removal(config, ACCESS_TOKEN_COOKIE))
        .remove(removal(config, REFRESH_TOKEN_COOKIE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(expires_in: Option<i64>, refresh: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "at".into(),
            refresh_token: refresh.map(str::to_string),
            id_token: None,
            token_type: Some("Bearer".into()),
            expires_in,
        }
    }

    #[test]
    fn test_store_tokens_sets_attributes() {
        let config = CookieConfig {
            domain: Some("nofeed.zone".into()),
            secure: true,
            same_site: SameSitePolicy::Strict,
        };
        let jar = store_tokens(CookieJar::new(), &config, &tokens(Some(3600), Some("rt")));

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "at");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Strict));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.domain(), Some("nofeed.zone"));
        assert_eq!(access.max_age(), Some(Duration::seconds(3600)));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.max_age(), Some(Duration::days(30)));
    }

    #[test]
    fn test_no_refresh_cookie_without_refresh_token() {
        let jar = store_tokens(CookieJar::new(), &CookieConfig::default(), &tokens(None, None));
        assert!(jar.get(REFRESH_TOKEN_COOKIE).is_none());
        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE).unwrap().max_age(), None);
    }

    #[test]
    fn test_state_cookie_is_lax() {
        let config = CookieConfig {
            same_site: SameSitePolicy::Strict,
            ..Default::default()
        };
        let cookie = state_cookie(&config, new_login_state());
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.value().len(), 32);
    }
}
