//! # nofeed DB
//!
//! Database pool construction and the error type shared by every storage
//! collaborator.
//!
//! The pool is built either from a plain `DATABASE_URL` or from credentials
//! resolved out of a [`SecretsStore`] (AWS Secrets Manager in deployment).
//! Secret-derived connections always require TLS.
//!
//! # Example
//!
//! ```ignore
//! use nofeed_config::DatabaseConfig;
//! use nofeed_db::init_db_pool;
//!
//! let config = DatabaseConfig::from_source(&|k| std::env::var(k).ok())?;
//! let pool = init_db_pool(&config).await?;
//! ```

mod credentials;
mod error;
mod secrets;

pub use credentials::DbSecret;
pub use error::StoreError;
pub use secrets::{AwsSecretsStore, SecretsError, SecretsStore};

use nofeed_config::{DatabaseConfig, DatabaseSource};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

pub use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("invalid DATABASE_URL")]
    InvalidUrl(#[source] sqlx::Error),
    #[error(transparent)]
    Secrets(#[from] SecretsError),
    #[error("failed to connect to database")]
    Connect(#[source] sqlx::Error),
}

/// Builds the connection pool described by `config`.
///
/// For [`DatabaseSource::Secret`] the AWS SDK is configured from the default
/// provider chain; use [`init_db_pool_with`] to supply another store.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    match &config.source {
        DatabaseSource::Url(_) => init_db_pool_with(config, &secrets::Unused).await,
        DatabaseSource::Secret(_) => {
            let store = AwsSecretsStore::from_env().await;
            init_db_pool_with(config, &store).await
        }
    }
}

pub async fn init_db_pool_with(
    config: &DatabaseConfig,
    secrets: &dyn SecretsStore,
) -> Result<PgPool, DbError> {
    let options = connect_options(&config.source, secrets).await?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .connect_with(options)
        .await
        .map_err(DbError::Connect)?;

    info!(max_connections = config.max_connections, "database pool ready");
    Ok(pool)
}

/// Resolves the connection options without opening a connection.
pub async fn connect_options(
    source: &DatabaseSource,
    secrets: &dyn SecretsStore,
) -> Result<PgConnectOptions, DbError> {
    match source {
        DatabaseSource::Url(url) => url.parse().map_err(DbError::InvalidUrl),
        DatabaseSource::Secret(id) => {
            let raw = secrets.fetch_secret(id).await?;
            let secret = DbSecret::parse(&raw)?;
            info!(host = %secret.host, dbname = %secret.dbname, "resolved database credentials");
            Ok(secret.connect_options())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sqlx::postgres::PgSslMode;

    struct StaticSecrets(&'static str);

    #[async_trait]
    impl SecretsStore for StaticSecrets {
        async fn fetch_secret(&self, _id: &str) -> Result<String, SecretsError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_secret_source_builds_tls_options() {
        let store = StaticSecrets(
            r#"{"username":"app","password":"p@ss word","engine":"postgres","host":"db.internal","port":"5433","dbname":"nofeed"}"#,
        );
        let options = connect_options(&DatabaseSource::Secret("arn:db".into()), &store)
            .await
            .unwrap();

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "app");
        assert_eq!(options.get_database(), Some("nofeed"));
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Require));
    }

    #[tokio::test]
    async fn test_malformed_secret_is_reported() {
        let store = StaticSecrets(r#"{"username":"app"}"#);
        let err = connect_options(&DatabaseSource::Secret("arn:db".into()), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Secrets(_)));
    }

    #[tokio::test]
    async fn test_url_source_ignores_secrets() {
        let options = connect_options(
            &DatabaseSource::Url("postgres://app:pw@localhost:5432/nofeed".into()),
            &secrets::Unused,
        )
        .await
        .unwrap();
        assert_eq!(options.get_database(), Some("nofeed"));
    }
}
