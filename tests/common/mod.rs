#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use nofeed::router::init_router;
use nofeed::state::AppState;
use nofeed::store::UserStore;
use nofeed::store::memory::{MemoryPostStore, MemoryUserStore};
use nofeed_auth::TokenValidator;
use nofeed_auth::testing::{StaticKeySource, TestSigner, auth0_config};
use nofeed_config::{
    AppConfig, CookieConfig, CorsConfig, DatabaseConfig, DatabaseSource, ServerConfig,
};

pub const TEST_VERSION: &str = "1.2.3-test";

pub struct TestApp {
    pub router: Router,
    pub signer: TestSigner,
    pub posts: Arc<MemoryPostStore>,
    pub users: Arc<MemoryUserStore>,
    pub config: AppConfig,
}

/// `auth0_base` points the tenant endpoints at a mock server.
pub fn test_config(auth0_base: Option<&str>) -> AppConfig {
    AppConfig {
        auth0: auth0_config(auth0_base),
        cookies: CookieConfig::default(),
        cors: CorsConfig {
            allowed_origins: vec!["https://nofeed.zone".to_string()],
        },
        database: DatabaseConfig {
            source: DatabaseSource::Url("postgres://unused/nofeed".to_string()),
            max_connections: 1,
            connect_timeout: Duration::from_secs(1),
            migration_timeout: Duration::from_secs(1),
        },
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            version: TEST_VERSION.to_string(),
            request_timeout: Duration::from_secs(5),
        },
    }
}

pub fn build_app() -> TestApp {
    build_app_with(test_config(None))
}

pub fn build_app_with(config: AppConfig) -> TestApp {
    let posts = Arc::new(MemoryPostStore::new());
    let users = Arc::new(MemoryUserStore::new());
    let keys = Arc::new(StaticKeySource::new(TestSigner::jwks()));
    let validator = TokenValidator::new(&config.auth0, keys);

    let state = AppState::new(&config, posts.clone(), users.clone(), validator)
        .expect("state builds");

    TestApp {
        router: init_router(state),
        signer: TestSigner::for_config(&config.auth0),
        posts,
        users,
        config,
    }
}

impl TestApp {
    pub fn token(&self, subject: &str) -> String {
        self.signer.token(subject)
    }

    pub async fn grant(&self, subject: &str, role: &str) {
        self.users.ensure_user(subject).await.unwrap();
        self.users.set_role(subject, role).await.unwrap();
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sends a JSON request as `subject` (anonymous when `None`) and returns
    /// the status with the decoded body.
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        subject: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(subject) = subject {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token(subject)),
            );
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub fn find_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{}=", name);
    cookies
        .iter()
        .find(|c| c.starts_with(&prefix))
        .map(String::as_str)
}
