//! Locating the bearer credential on an inbound request.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::cookie::CookieJar;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Parses an `Authorization` value of exactly the form `Bearer <token>`.
///
/// Any other shape (wrong scheme, extra segments, empty token) yields `None`.
pub fn bearer_from_header(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Returns the access token from the `Authorization` header, falling back to
/// the `access_token` cookie. A malformed header does not block the fallback.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_from_header);

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::COOKIE};

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_shapes() {
        assert_eq!(bearer_from_header("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_from_header("bearer abc"), None);
        assert_eq!(bearer_from_header("Bearer"), None);
        assert_eq!(bearer_from_header("Bearer "), None);
        assert_eq!(bearer_from_header("Bearer a b"), None);
        assert_eq!(bearer_from_header("Basic dXNlcjpwdw=="), None);
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let map = headers(&[
            (AUTHORIZATION, "Bearer from-header"),
            (COOKIE, "access_token=from-cookie"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let map = headers(&[(COOKIE, "theme=dark; access_token=from-cookie")]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_malformed_header_still_uses_cookie() {
        let map = headers(&[
            (AUTHORIZATION, "Token nope"),
            (COOKIE, "access_token=from-cookie"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_nothing_present() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        let map = headers(&[(AUTHORIZATION, "Bearer a b")]);
        assert_eq!(extract_token(&map), None);
    }
}
