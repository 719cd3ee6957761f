//! Signing key retrieval and caching.
//!
//! [`KeyCache`] holds an immutable snapshot of `kid -> DecodingKey` behind a
//! [`RwLock`]. A snapshot older than the TTL is replaced on the next lookup.
//! A `kid` missing from a fresh snapshot triggers an early refetch (key
//! rotation), but at most once per `min_refetch_interval` so that tokens with
//! made-up key ids cannot hammer the identity provider. Refreshes are
//! serialised: concurrent misses wait for the one fetch in flight. A failed
//! fetch is not retried before `min_refetch_interval` has passed, and cached
//! keys keep working meanwhile.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(10);
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum KeySourceError {
    #[error("JWKS request failed")]
    Request(#[from] reqwest::Error),
    #[error("JWKS contained no usable signing keys")]
    NoKeys,
    #[error("JWKS fetch failed recently; not retrying yet")]
    BackingOff,
    #[error("{0}")]
    Other(String),
}

/// Where signing keys come from.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, KeySourceError>;
}

/// Fetches the key set from the provider's `/.well-known/jwks.json`.
#[derive(Clone, Debug)]
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        let keys = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        debug!(count = keys.keys.len(), "fetched JWKS");
        Ok(keys)
    }
}

struct KeySnapshot {
    fetched_at: Instant,
    keys: HashMap<String, DecodingKey>,
}

impl KeySnapshot {
    fn from_jwks(set: &JwkSet) -> Self {
        let keys = set
            .keys
            .iter()
            .filter(|jwk| matches!(jwk.algorithm, AlgorithmParameters::RSA(_)))
            .filter_map(|jwk| {
                let kid = jwk.common.key_id.clone()?;
                match DecodingKey::from_jwk(jwk) {
                    Ok(key) => Some((kid, key)),
                    Err(e) => {
                        warn!(kid = %kid, error = %e, "skipping unusable JWK");
                        None
                    }
                }
            })
            .collect();

        Self {
            fetched_at: Instant::now(),
            keys,
        }
    }
}

enum Lookup {
    Hit(DecodingKey),
    /// The snapshot is fresh and recent enough that a refetch is not allowed.
    Miss,
    Refetch,
}

pub struct KeyCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    min_refetch_interval: Duration,
    snapshot: RwLock<Option<Arc<KeySnapshot>>>,
    /// Held while fetching; records when the last fetch failed.
    refresh: Mutex<Option<Instant>>,
}

impl KeyCache {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            ttl: DEFAULT_CACHE_TTL,
            min_refetch_interval: DEFAULT_MIN_REFETCH_INTERVAL,
            snapshot: RwLock::new(None),
            refresh: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_min_refetch_interval(mut self, interval: Duration) -> Self {
        self.min_refetch_interval = interval;
        self
    }

    fn lookup(&self, snapshot: &KeySnapshot, kid: &str) -> Lookup {
        let age = snapshot.fetched_at.elapsed();
        if age >= self.ttl {
            return Lookup::Refetch;
        }
        match snapshot.keys.get(kid) {
            Some(key) => Lookup::Hit(key.clone()),
            None if age >= self.min_refetch_interval => Lookup::Refetch,
            None => Lookup::Miss,
        }
    }

    /// Returns the key for `kid`, or `None` when the provider does not
    /// publish it. Errors only when keys have to be fetched and cannot be.
    ///
    /// When a fetch fails, keys already in the snapshot stay usable and no
    /// new fetch is attempted for `min_refetch_interval`; callers waiting on
    /// the failed fetch get the failure without fetching again.
    pub async fn key_for(&self, kid: &str) -> Result<Option<DecodingKey>, KeySourceError> {
        let seen = self.snapshot.read().await.clone();
        if let Some(snapshot) = &seen {
            match self.lookup(snapshot, kid) {
                Lookup::Hit(key) => return Ok(Some(key)),
                Lookup::Miss => return Ok(None),
                Lookup::Refetch => {}
            }
        }

        let mut last_failure = self.refresh.lock().await;

        // Another task may have refreshed while we waited for the lock.
        let current = self.snapshot.read().await.clone();
        if let Some(snapshot) = &current {
            let refreshed = match &seen {
                Some(old) => !Arc::ptr_eq(old, snapshot),
                None => true,
            };
            if refreshed {
                return Ok(snapshot.keys.get(kid).cloned());
            }
        }

        if let Some(failed_at) = *last_failure {
            if failed_at.elapsed() < self.min_refetch_interval {
                return Self::stale_key(current.as_deref(), kid)
                    .map(Some)
                    .ok_or(KeySourceError::BackingOff);
            }
        }

        let fetched = self.source.fetch().await.and_then(|set| {
            let snapshot = KeySnapshot::from_jwks(&set);
            if snapshot.keys.is_empty() {
                return Err(KeySourceError::NoKeys);
            }
            Ok(Arc::new(snapshot))
        });

        match fetched {
            Ok(snapshot) => {
                *last_failure = None;
                info!(keys = snapshot.keys.len(), "refreshed signing keys");
                let key = snapshot.keys.get(kid).cloned();
                *self.snapshot.write().await = Some(snapshot);
                Ok(key)
            }
            Err(e) => {
                *last_failure = Some(Instant::now());
                match Self::stale_key(current.as_deref(), kid) {
                    Some(key) => {
                        warn!(error = %e, "key refresh failed, serving cached key");
                        Ok(Some(key))
                    }
                    None => Err(e),
                }
            }
        }
    }

    fn stale_key(snapshot: Option<&KeySnapshot>, kid: &str) -> Option<DecodingKey> {
        snapshot.and_then(|s| s.keys.get(kid).cloned())
    }
}
