use std::fmt;

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::SecretsError;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPort {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
struct RawSecret {
    username: Option<String>,
    password: Option<String>,
    engine: Option<String>,
    host: Option<String>,
    port: Option<RawPort>,
    dbname: Option<String>,
}

/// Database credentials in the shape stored by RDS-managed secrets.
#[derive(Clone)]
pub struct DbSecret {
    pub username: String,
    pub password: String,
    pub engine: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
}

impl fmt::Debug for DbSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSecret")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .finish()
    }
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, SecretsError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(SecretsError::MissingField(field))
}

impl DbSecret {
    pub fn parse(raw: &str) -> Result<Self, SecretsError> {
        let secret: RawSecret = serde_json::from_str(raw)?;

        let port = match secret.port {
            None => return Err(SecretsError::MissingField("port")),
            Some(RawPort::Number(n)) => {
                u16::try_from(n).map_err(|_| SecretsError::InvalidPort(n.to_string()))?
            }
            Some(RawPort::Text(s)) => s
                .trim()
                .parse::<u16>()
                .map_err(|_| SecretsError::InvalidPort(s.clone()))?,
        };
        if port == 0 {
            return Err(SecretsError::InvalidPort("0".to_string()));
        }

        Ok(Self {
            username: non_empty(secret.username, "username")?,
            password: non_empty(secret.password, "password")?,
            engine: secret.engine,
            host: non_empty(secret.host, "host")?,
            port,
            dbname: non_empty(secret.dbname, "dbname")?,
        })
    }

    /// Connection options with TLS required. Credentials are passed as
    /// discrete fields, so no escaping of the password is needed.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(PgSslMode::Require)
    }
}
