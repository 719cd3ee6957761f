//! # nofeed Auth
//!
//! The front half of the request-authorization pipeline:
//!
//! ```text
//! request ──► extract ──► TokenValidator ──► Principal
//!                              │
//!                              ▼
//!                         KeyCache ──► KeySource (JWKS over HTTP)
//! ```
//!
//! - [`extract`]: finds the bearer credential in a header or cookie
//! - [`validator`]: verifies RS256 signatures and registered claims
//! - [`jwks`]: fetches and caches the identity provider's signing keys
//! - [`claims`]: the token payload and the [`Principal`] built from it
//! - [`oauth`]: the Auth0 authorization-code and refresh-token client
//!
//! With the `test-utils` feature the [`testing`] module provides a signer
//! backed by a checked-in RSA key and an in-process key source.

pub mod claims;
pub mod extract;
pub mod jwks;
pub mod oauth;
pub mod validator;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use claims::{AccessTokenClaims, Principal};
pub use extract::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, bearer_from_header, extract_token};
pub use jwks::{HttpKeySource, KeyCache, KeySource, KeySourceError};
pub use oauth::{Auth0Client, OAuthError, TokenResponse};
pub use validator::{AuthError, TokenValidator};
