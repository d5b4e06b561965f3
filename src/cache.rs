//! The cache side of the cache-aside protocol.
//!
//! A [`CacheBackend`] is a fallible driver for some key/value service. [`CacheStore`] is what repositories get: it owns
//! a backend and turns every backend failure into a logged miss or no-op, so the cache can only ever make things
//! faster, never make an operation fail.

pub mod keys;
pub mod memory;
pub mod redis;

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fieldx::fxstruct;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::error::CacheError;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

/// A remote or local key/value service.
///
/// Values are UTF-8 strings; a `ttl` of `None` means the entry lives until it is overwritten or deleted.
#[async_trait]
pub trait CacheBackend: Debug + Send + Sync + 'static {
    /// Backend name, for logging.
    fn name(&self) -> &'static str;
    async fn connect(&self) -> Result<(), CacheError>;
    async fn close(&self) -> Result<(), CacheError>;
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    /// Delete every key matching a Redis-style glob. Returns the number of deleted keys.
    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, CacheError>;
}

/// Best-effort cache shared by all repositories of a process.
///
/// ```ignore
/// let cache = Arc::new(CacheStore::new(Arc::new(RedisBackend::from_host("localhost", 6379, timeout)?)));
/// cache.connect().await;
/// let producers = ProducerRepository::new(cache.clone(), store.clone(), list_ttl);
/// // ...
/// cache.close().await;
/// ```
#[derive(Debug, Clone)]
#[fxstruct(sync, no_new, default(off))]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.backend.name()
    }

    /// Establish the backend connection. A failure is logged and the store keeps working as a permanent miss.
    pub async fn connect(&self) -> bool {
        match self.backend.connect().await {
            Ok(()) => {
                info!("[{}] cache connected", self.name());
                true
            }
            Err(err) => {
                error!("[{}] cache connection failed, running without cache: {err}", self.name());
                false
            }
        }
    }

    pub async fn close(&self) {
        match self.backend.close().await {
            Ok(()) => info!("[{}] cache closed", self.name()),
            Err(err) => warn!("[{}] error while closing cache: {err}", self.name()),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => {
                debug!(hit = value.is_some(), "[{}] GET {key}", self.name());
                value
            }
            Err(err) => {
                warn!("[{}] GET {key} failed: {err}", self.name());
                None
            }
        }
    }

    #[instrument(level = "trace", skip(self, value))]
    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        match self.backend.set(key, value, ttl).await {
            Ok(()) => debug!(?ttl, "[{}] SET {key}", self.name()),
            Err(err) => warn!("[{}] SET {key} failed: {err}", self.name()),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn delete(&self, key: &str) {
        match self.backend.delete(key).await {
            Ok(()) => debug!("[{}] DEL {key}", self.name()),
            Err(err) => warn!("[{}] DEL {key} failed: {err}", self.name()),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn delete_by_pattern(&self, pattern: &str) -> u64 {
        match self.backend.delete_by_pattern(pattern).await {
            Ok(count) => {
                debug!("[{}] DEL pattern={pattern} ({count} keys)", self.name());
                count
            }
            Err(err) => {
                warn!("[{}] DEL pattern={pattern} failed: {err}", self.name());
                0
            }
        }
    }

    /// Fetch and decode a JSON value. Undecodable payloads count as a miss.
    pub async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("[{}] discarding undecodable value of {key}: {err}", self.name());
                None
            }
        }
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Option<Duration>)
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw, ttl).await,
            Err(err) => warn!("[{}] cannot encode value for {key}: {err}", self.name()),
        }
    }
}
