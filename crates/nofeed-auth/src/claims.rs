//! Access token payload and the validated identity derived from it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `aud` claim may be a single string or an array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Audience::One(aud) => vec![aud],
            Audience::Many(auds) => auds,
        }
    }
}

/// Registered claims of an Auth0 access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iss: String,
    pub aud: Audience,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Space-delimited scope list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Identity established for one request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// External subject id, e.g. `auth0|abc123`.
    pub subject: String,
    pub scopes: BTreeSet<String>,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    /// Builds the principal from already-verified claims. Returns `None` when
    /// the expiry is outside the representable range.
    pub fn from_claims(claims: AccessTokenClaims) -> Option<Self> {
        let expires_at = DateTime::from_timestamp(claims.exp, 0)?;
        let scopes = claims
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Some(Self {
            subject: claims.sub,
            scopes,
            issuer: claims.iss,
            audience: claims.aud.into_vec(),
            expires_at,
        })
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}
