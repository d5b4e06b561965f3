use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use globset::Glob;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use moka::Expiry;

use super::CacheBackend;
use crate::error::CacheError;

#[derive(Clone, Debug)]
struct Stored {
    value: String,
    ttl:   Option<Duration>,
}

// Every write carries its own TTL. Overwriting an entry restarts its clock, like Redis `SET` does.
struct PerEntryTtl;

impl Expiry<String, Stored> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Stored, _created_at: Instant) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Stored,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-process cache backend over [moka](https://crates.io/crates/moka).
///
/// Used for tests and for running without a Redis server. Until [`connect`](CacheBackend::connect) is called and
/// after [`close`](CacheBackend::close) every operation fails with [`CacheError::NotConnected`].
#[derive(Debug)]
pub struct MemoryBackend {
    cache:     Cache<String, Stored>,
    connected: AtomicBool,
}

impl MemoryBackend {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache:     Cache::builder()
                .name("agro-cache")
                .max_capacity(max_capacity)
                .eviction_policy(EvictionPolicy::tiny_lfu())
                .expire_after(PerEntryTtl)
                .build(),
            connected: AtomicBool::new(false),
        }
    }

    /// A backend which doesn't need an explicit `connect`.
    pub fn connected(max_capacity: u64) -> Self {
        let backend = Self::new(max_capacity);
        backend.connected.store(true, Ordering::Release);
        backend
    }

    fn ensure_connected(&self) -> Result<(), CacheError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        }
        else {
            Err(CacheError::NotConnected)
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn connect(&self) -> Result<(), CacheError> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheError> {
        self.connected.store(false, Ordering::Release);
        self.cache.invalidate_all();
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.ensure_connected()?;
        Ok(self.cache.get(key).await.map(|s| s.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.ensure_connected()?;
        self.cache
            .insert(
                key.to_string(),
                Stored {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.ensure_connected()?;
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        self.ensure_connected()?;
        let matcher = Glob::new(pattern)?.compile_matcher();

        let matching: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| matcher.is_match(key.as_str()))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let mut deleted = 0;
        for key in matching {
            if self.cache.remove(&key).await.is_some() {
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}
