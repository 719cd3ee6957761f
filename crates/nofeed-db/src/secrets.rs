use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::Client;
use tracing::instrument;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("failed to fetch secret {id}")]
    Fetch {
        id: String,
        #[source]
        source: BoxError,
    },
    #[error("secret {0} has no string value")]
    Empty(String),
    #[error("secret is not valid JSON")]
    Malformed(#[from] serde_json::Error),
    #[error("secret is missing required field {0}")]
    MissingField(&'static str),
    #[error("secret has invalid port {0:?}")]
    InvalidPort(String),
}

/// Resolves a secret identifier to its string payload.
#[async_trait]
pub trait SecretsStore: Send + Sync {
    async fn fetch_secret(&self, id: &str) -> Result<String, SecretsError>;
}

#[derive(Clone, Debug)]
pub struct AwsSecretsStore {
    client: Client,
}

impl AwsSecretsStore {
    /// Configures the client from the default AWS provider chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl SecretsStore for AwsSecretsStore {
    #[instrument(skip(self))]
    async fn fetch_secret(&self, id: &str) -> Result<String, SecretsError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(id)
            .send()
            .await
            .map_err(|e| SecretsError::Fetch {
                id: id.to_string(),
                source: Box::new(e),
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| SecretsError::Empty(id.to_string()))
    }
}

/// Stand-in for URL-configured databases, which never consult a store.
pub(crate) struct Unused;

#[async_trait]
impl SecretsStore for Unused {
    async fn fetch_secret(&self, id: &str) -> Result<String, SecretsError> {
        Err(SecretsError::Empty(id.to_string()))
    }
}
