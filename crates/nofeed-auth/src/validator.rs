//! Access token verification.
//!
//! Every failure other than an unreachable key provider collapses into
//! [`AuthError::InvalidToken`]; the specific cause is logged at `warn` and
//! never returned to the caller.

use std::sync::Arc;

use anyhow::anyhow;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use nofeed_config::Auth0Config;
use nofeed_core::AppError;
use tracing::{error, warn};

use crate::claims::{AccessTokenClaims, Principal};
use crate::jwks::{HttpKeySource, KeyCache, KeySource, KeySourceError};

const ALGORITHM: Algorithm = Algorithm::RS256;
const LEEWAY_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("signing keys unavailable")]
    KeysUnavailable(#[source] KeySourceError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => AppError::unauthorized(anyhow!("missing bearer token")),
            AuthError::InvalidToken => AppError::unauthorized(anyhow!("invalid token")),
            AuthError::KeysUnavailable(_) => AppError::unavailable(err),
        }
    }
}

pub struct TokenValidator {
    keys: KeyCache,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: &Auth0Config, source: Arc<dyn KeySource>) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_nbf = true;
        validation.leeway = LEEWAY_SECS;

        Self {
            keys: KeyCache::new(source).with_ttl(config.jwks_cache_ttl),
            validation,
        }
    }

    /// Validator backed by the tenant's published JWKS.
    pub fn from_config(config: &Auth0Config) -> Result<Self, KeySourceError> {
        let source = HttpKeySource::new(config.jwks_url())?;
        Ok(Self::new(config, Arc::new(source)))
    }

    pub async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let header = decode_header(token).map_err(|e| {
            warn!(error = %e, "rejecting token with unreadable header");
            AuthError::InvalidToken
        })?;

        if header.alg != ALGORITHM {
            warn!(alg = ?header.alg, "rejecting token signed with unexpected algorithm");
            return Err(AuthError::InvalidToken);
        }

        let Some(kid) = header.kid else {
            warn!("rejecting token without kid");
            return Err(AuthError::InvalidToken);
        };

        let key = match self.keys.key_for(&kid).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                warn!(kid = %kid, "rejecting token signed by unknown key");
                return Err(AuthError::InvalidToken);
            }
            Err(e) => {
                error!(error = %e, "could not load signing keys");
                return Err(AuthError::KeysUnavailable(e));
            }
        };

        let data = decode::<AccessTokenClaims>(token, &key, &self.validation).map_err(|e| {
            warn!(kid = %kid, error = %e, "token failed validation");
            AuthError::InvalidToken
        })?;

        if data.claims.sub.is_empty() {
            warn!("rejecting token with empty subject");
            return Err(AuthError::InvalidToken);
        }

        Principal::from_claims(data.claims).ok_or_else(|| {
            warn!("rejecting token with out-of-range expiry");
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Audience;
    use crate::testing::{FailingKeySource, StaticKeySource, TestSigner, auth0_config};
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use nofeed_core::StatusCode;

    fn setup() -> (TokenValidator, TestSigner) {
        let config = auth0_config(None);
        let source = Arc::new(StaticKeySource::new(TestSigner::jwks()));
        (
            TokenValidator::new(&config, source),
            TestSigner::for_config(&config),
        )
    }

    async fn assert_invalid(validator: &TokenValidator, token: &str) {
        assert!(matches!(
            validator.validate(token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_valid_token_yields_subject() {
        let (validator, signer) = setup();
        let principal = validator.validate(&signer.token("auth0|abc")).await.unwrap();

        assert_eq!(principal.subject, "auth0|abc");
        assert_eq!(principal.issuer, auth0_config(None).issuer());
        assert!(principal.has_scope("openid"));
    }

    #[tokio::test]
    async fn test_single_string_audience_accepted() {
        let (validator, signer) = setup();
        let mut claims = signer.claims("auth0|abc");
        claims.aud = Audience::One(auth0_config(None).audience);
        assert!(validator.validate(&signer.sign(&claims)).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_issuer() {
        let (validator, signer) = setup();
        let mut claims = signer.claims("auth0|abc");
        claims.iss = "https://evil.example.com/".into();
        assert_invalid(&validator, &signer.sign(&claims)).await;
    }

    #[tokio::test]
    async fn test_wrong_audience() {
        let (validator, signer) = setup();
        let mut claims = signer.claims("auth0|abc");
        claims.aud = Audience::One("https://someone-else".into());
        assert_invalid(&validator, &signer.sign(&claims)).await;
    }

    #[tokio::test]
    async fn test_expired() {
        let (validator, signer) = setup();
        let mut claims = signer.claims("auth0|abc");
        claims.exp = Utc::now().timestamp() - 3600;
        assert_invalid(&validator, &signer.sign(&claims)).await;
    }

    #[tokio::test]
    async fn test_not_yet_valid() {
        let (validator, signer) = setup();
        let mut claims = signer.claims("auth0|abc");
        claims.nbf = Some(Utc::now().timestamp() + 600);
        assert_invalid(&validator, &signer.sign(&claims)).await;
    }

    #[tokio::test]
    async fn test_bad_signature() {
        let (validator, signer) = setup();
        let claims = signer.claims("auth0|abc");
        assert_invalid(&validator, &signer.sign_with_rogue_key(&claims)).await;
    }

    #[tokio::test]
    async fn test_unknown_kid() {
        let (validator, signer) = setup();
        let claims = signer.claims("auth0|abc");
        assert_invalid(&validator, &signer.sign_with_kid("other", &claims)).await;
    }

    #[tokio::test]
    async fn test_hs256_token_rejected() {
        let (validator, signer) = setup();
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(crate::testing::TEST_KID.into());
        let token = encode(
            &header,
            &signer.claims("auth0|abc"),
            &EncodingKey::from_secret(b"guessable"),
        )
        .unwrap();
        assert_invalid(&validator, &token).await;
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let (validator, _) = setup();
        assert_invalid(&validator, "not-a-jwt").await;
    }

    #[tokio::test]
    async fn test_key_provider_down_is_unavailable() {
        let config = auth0_config(None);
        let validator = TokenValidator::new(&config, Arc::new(FailingKeySource));
        let token = TestSigner::for_config(&config).token("auth0|abc");

        let err = validator.validate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::KeysUnavailable(_)));
        assert_eq!(AppError::from(err).status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            AppError::from(AuthError::MissingToken).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::InvalidToken).status,
            StatusCode::UNAUTHORIZED
        );
    }
}
