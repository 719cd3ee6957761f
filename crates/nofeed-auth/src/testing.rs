//! Test helpers: a token signer backed by a checked-in RSA key and an
//! in-process [`KeySource`].
//!
//! The fixture keys under `fixtures/` exist only for tests and sign nothing
//! outside this workspace.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use nofeed_config::Auth0Config;
use serde_json::json;

use crate::claims::{AccessTokenClaims, Audience};
use crate::jwks::{KeySource, KeySourceError};

pub const TEST_KID: &str = "nofeed-test-key";
pub const TEST_DOMAIN: &str = "nofeed-test.eu.auth0.com";
pub const TEST_AUDIENCE: &str = "https://api.nofeed.test";

const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
const ROGUE_KEY_PEM: &str = include_str!("../fixtures/rogue_key.pem");

/// Base64url modulus of `fixtures/signing_key.pem`.
const SIGNING_KEY_MODULUS: &str = "nslyCRcLb1w5eOjYbBPGFJfT67rvfhidgzOZBCYtdI3My0nNkzffvPYQ8D4r7ETQP3_2yCn7MZ_VpZXtCX0q7j-QavuSWngBDI8m_y8BPoUlwfjZIm4UjnmUQVTUQdHU9wzsG0t6E2__txZn15LnNVGrIoH3N5pGCcIk37iig6ArGItny5rRbkO2ZmIKR4K1Ijj8vF1_p9UJ52zEdZod3Af5ME3o929-gmHgCdBaz3LzjbTIWNkrjjn5hatdO1W1YdxOXuwpl53te1STXQmYZpslpBGF1BlQJOHTicweG39CGzt077bg04Ke-0o-UnDpZiAhJHeuuVljCsu4SFu6Yw";
const RSA_EXPONENT: &str = "AQAB";

/// Config for a tenant that only exists in tests. `base_url`, when given,
/// points the tenant endpoints at a mock server such as `http://127.0.0.1:4321`.
pub fn auth0_config(base_url: Option<&str>) -> Auth0Config {
    let (scheme, domain) = match base_url.and_then(|url| url.split_once("://")) {
        Some((scheme, host)) => (scheme.to_string(), host.trim_end_matches('/').to_string()),
        None => ("https".to_string(), TEST_DOMAIN.to_string()),
    };

    Auth0Config {
        domain,
        audience: TEST_AUDIENCE.to_string(),
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        callback_url: "http://localhost:8080/api/callback".to_string(),
        logout_return_url: "https://nofeed.zone".to_string(),
        post_login_url: "https://nofeed.zone".to_string(),
        scheme,
        jwks_cache_ttl: Duration::from_secs(300),
    }
}

#[derive(Clone, Debug)]
pub struct TestSigner {
    issuer: String,
    audience: String,
}

impl TestSigner {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub fn for_config(config: &Auth0Config) -> Self {
        Self::new(config.issuer(), config.audience.clone())
    }

    /// Claims that pass validation: one hour of life left.
    pub fn claims(&self, subject: &str) -> AccessTokenClaims {
        let now = Utc::now().timestamp();
        AccessTokenClaims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            aud: Audience::Many(vec![
                self.audience.clone(),
                format!("{}userinfo", self.issuer),
            ]),
            exp: now + 3600,
            nbf: None,
            iat: Some(now),
            scope: Some("openid profile email".to_string()),
        }
    }

    pub fn token(&self, subject: &str) -> String {
        self.sign(&self.claims(subject))
    }

    pub fn sign(&self, claims: &AccessTokenClaims) -> String {
        Self::sign_with(SIGNING_KEY_PEM, Self::header(TEST_KID), claims)
    }

    pub fn sign_with_kid(&self, kid: &str, claims: &AccessTokenClaims) -> String {
        Self::sign_with(SIGNING_KEY_PEM, Self::header(kid), claims)
    }

    /// Signs with an unrelated key while claiming the published `kid`.
    pub fn sign_with_rogue_key(&self, claims: &AccessTokenClaims) -> String {
        Self::sign_with(ROGUE_KEY_PEM, Self::header(TEST_KID), claims)
    }

    fn header(kid: &str) -> Header {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        header
    }

    fn sign_with(pem: &str, header: Header, claims: &AccessTokenClaims) -> String {
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key is valid PEM");
        encode(&header, claims, &key).expect("fixture claims encode")
    }

    /// The public half of the signing key, published under [`TEST_KID`].
    pub fn jwks() -> JwkSet {
        Self::jwks_with_kid(TEST_KID)
    }

    pub fn jwks_with_kid(kid: &str) -> JwkSet {
        serde_json::from_value(json!({
            "keys": [{
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": kid,
                "n": SIGNING_KEY_MODULUS,
                "e": RSA_EXPONENT,
            }]
        }))
        .expect("fixture JWKS is well formed")
    }
}

/// Serves a fixed key set and counts how often it was asked.
pub struct StaticKeySource {
    keys: Mutex<JwkSet>,
    fetches: AtomicUsize,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys: Mutex::new(keys),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn replace(&self, keys: JwkSet) {
        *self.keys.lock().unwrap_or_else(|e| e.into_inner()) = keys;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}

/// A key source whose provider is down.
pub struct FailingKeySource;

#[async_trait]
impl KeySource for FailingKeySource {
    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        Err(KeySourceError::Other("identity provider unreachable".to_string()))
    }
}
