use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use fieldx::fxstruct;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use redis::RedisError;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::debug;

use super::CacheBackend;
use crate::error::CacheError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

// Whole seconds for `SET EX`, rounded up. EX 0 is rejected by the server.
fn expire_secs(ttl: Duration) -> u64 {
    (ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0)).max(1)
}

/// Redis cache backend.
///
/// A single multiplexed connection is opened by [`connect`](CacheBackend::connect) and shared by all callers. Every
/// command is bounded by the configured timeout.
#[fxstruct(sync, no_new, default(off))]
pub struct RedisBackend {
    client: redis::Client,

    /// Per-command timeout.
    #[fieldx(get(copy))]
    timeout: Duration,

    conn: RwLock<Option<MultiplexedConnection>>,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("connection", &self.client.get_connection_info().addr)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RedisBackend {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            timeout,
            conn: RwLock::new(None),
        })
    }

    pub fn from_host(host: &str, port: u16, timeout: Duration) -> Result<Self, CacheError> {
        Self::new(&format!("redis://{host}:{port}"), timeout)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        self.conn.read().await.clone().ok_or(CacheError::NotConnected)
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, RedisError>> + Send,
    {
        Ok(timeout(self.timeout(), fut).await??)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn connect(&self) -> Result<(), CacheError> {
        let conn = self.bounded(self.client.get_multiplexed_tokio_connection()).await?;
        *self.conn.write().await = Some(conn);
        debug!("Connected to {}", self.client.get_connection_info().addr);
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheError> {
        self.conn.write().await.take();
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(conn.get::<_, Option<String>>(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(expire_secs(ttl));
        }
        self.bounded(cmd.query_async::<_, ()>(&mut conn)).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(conn.del::<_, ()>(key)).await
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = self.bounded(conn.keys(pattern)).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.bounded(conn.del::<_, u64>(keys)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_url_is_rejected() {
        assert!(matches!(
            RedisBackend::new("not a url", DEFAULT_TIMEOUT),
            Err(CacheError::Redis(_))
        ));
    }

    #[test]
    fn ttl_is_rounded_up_to_seconds() {
        assert_eq!(expire_secs(Duration::from_secs(3600)), 3600);
        assert_eq!(expire_secs(Duration::from_millis(1500)), 2);
        assert_eq!(expire_secs(Duration::from_millis(200)), 1);
        assert_eq!(expire_secs(Duration::from_nanos(3_000_000_001)), 4);
        assert_eq!(expire_secs(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn commands_before_connect() {
        let backend = RedisBackend::from_host("127.0.0.1", 6379, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(backend.timeout(), DEFAULT_TIMEOUT);
        assert!(matches!(backend.get("k").await, Err(CacheError::NotConnected)));
        assert!(matches!(backend.delete_by_pattern("*").await, Err(CacheError::NotConnected)));
    }

    // Nothing listens on port 1.
    #[tokio::test]
    async fn unreachable_server() {
        let backend = RedisBackend::from_host("127.0.0.1", 1, Duration::from_millis(200)).unwrap();
        assert!(backend.connect().await.is_err());
        assert!(matches!(backend.get("k").await, Err(CacheError::NotConnected)));
    }
}
