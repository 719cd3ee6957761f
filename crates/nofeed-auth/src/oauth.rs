//! Client for the Auth0 authorization-code and refresh-token grants.

use std::time::Duration;

use anyhow::anyhow;
use nofeed_config::Auth0Config;
use nofeed_core::AppError;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use url::Url;

const LOGIN_SCOPE: &str = "openid profile email offline_access";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("token endpoint unreachable")]
    Request(#[from] reqwest::Error),
    #[error("token endpoint rejected the grant with status {status}")]
    Rejected { status: u16, body: String },
    #[error("token endpoint failed with status {status}")]
    Upstream { status: u16 },
    #[error("token response has no access token")]
    MissingAccessToken,
    #[error("invalid provider URL")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Rejected { .. } => AppError::unauthorized(anyhow!("token exchange rejected")),
            OAuthError::InvalidUrl(_) => AppError::internal(err),
            _ => AppError::unavailable(err),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
enum Grant<'a> {
    AuthorizationCode {
        client_id: &'a str,
        client_secret: &'a str,
        code: &'a str,
        redirect_uri: &'a str,
    },
    RefreshToken {
        client_id: &'a str,
        client_secret: &'a str,
        refresh_token: &'a str,
    },
}

#[derive(Clone, Debug)]
pub struct Auth0Client {
    http: reqwest::Client,
    config: Auth0Config,
}

impl Auth0Client {
    pub fn new(config: Auth0Config) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Auth0Config {
        &self.config
    }

    /// The `/authorize` URL the browser is sent to on login.
    pub fn authorize_url(&self, state: &str) -> Result<Url, OAuthError> {
        let url = Url::parse_with_params(
            &self.config.authorize_url(),
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("scope", LOGIN_SCOPE),
                ("state", state),
                ("audience", self.config.audience.as_str()),
            ],
        )?;
        Ok(url)
    }

    /// The `/v2/logout` URL, ending the session at the provider as well.
    pub fn logout_url(&self) -> Result<Url, OAuthError> {
        let mut url = Url::parse_with_params(
            &self.config.logout_url(),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("returnTo", self.config.logout_return_url.as_str()),
            ],
        )?;
        let query = format!("{}&federated", url.query().unwrap_or_default());
        url.set_query(Some(&query));
        Ok(url)
    }

    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        self.request_token(&Grant::AuthorizationCode {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            code,
            redirect_uri: &self.config.callback_url,
        })
        .await
    }

    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthError> {
        self.request_token(&Grant::RefreshToken {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            refresh_token,
        })
        .await
    }

    async fn request_token(&self, grant: &Grant<'_>) -> Result<TokenResponse, OAuthError> {
        let response = self
            .http
            .post(self.config.token_url())
            .json(grant)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "token endpoint rejected grant");
            return Err(OAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            return Err(OAuthError::Upstream {
                status: status.as_u16(),
            });
        }

        let tokens: TokenResponse = response.json().await?;
        if tokens.access_token.is_empty() {
            return Err(OAuthError::MissingAccessToken);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::auth0_config;
    use nofeed_core::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_authorize_url() {
        let client = Auth0Client::new(auth0_config(None)).unwrap();
        let url = client.authorize_url("xyz").unwrap();

        assert_eq!(url.host_str(), Some("nofeed-test.eu.auth0.com"));
        assert_eq!(url.path(), "/authorize");
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("response_type".into(), "code".into())));
        assert!(params.contains(&("state".into(), "xyz".into())));
        assert!(params.contains(&("scope".into(), LOGIN_SCOPE.into())));
        assert!(params.contains(&("audience".into(), "https://api.nofeed.test".into())));
    }

    #[test]
    fn test_logout_url_is_federated() {
        let client = Auth0Client::new(auth0_config(None)).unwrap();
        let url = client.logout_url().unwrap();

        assert_eq!(url.path(), "/v2/logout");
        assert!(url.as_str().ends_with("&federated"));
        assert!(url.as_str().contains("returnTo=https%3A%2F%2Fnofeed.zone"));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_partial_json(json!({
                "grant_type": "authorization_code",
                "code": "the-code",
                "client_id": "test-client",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "refresh_token": "rt",
                "expires_in": 86400,
                "token_type": "Bearer",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Auth0Client::new(auth0_config(Some(&server.uri()))).unwrap();
        let tokens = client.exchange_code("the-code").await.unwrap();

        assert_eq!(tokens.access_token, "at");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt"));
        assert_eq!(tokens.expires_in, Some(86400));
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let client = Auth0Client::new(auth0_config(Some(&server.uri()))).unwrap();
        let err = client.refresh("stale").await.unwrap_err();

        assert!(matches!(err, OAuthError::Rejected { status: 403, .. }));
        assert_eq!(AppError::from(err).status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
            .mount(&server)
            .await;

        let client = Auth0Client::new(auth0_config(Some(&server.uri()))).unwrap();
        let err = client.exchange_code("c").await.unwrap_err();
        assert!(matches!(err, OAuthError::MissingAccessToken));
        assert_eq!(AppError::from(err).status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_provider_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = Auth0Client::new(auth0_config(Some(&server.uri()))).unwrap();
        let err = client.refresh("rt").await.unwrap_err();
        assert!(matches!(err, OAuthError::Upstream { status: 502 }));
    }
}
