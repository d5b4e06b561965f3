//! Process-scoped wiring of the primary store, the cache and the repositories.
use std::sync::Arc;
use std::time::Duration;

use fieldx::fxstruct;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use uuid::Uuid;

use crate::cache::CacheBackend;
use crate::cache::CacheStore;
use crate::cache::MemoryBackend;
use crate::cache::RedisBackend;
use crate::config::Config;
use crate::config::DatabaseKind;
use crate::dashboard::Dashboard;
use crate::db::DatabaseDriver;
use crate::db::SeaOrmStore;
use crate::error::AppError;
use crate::model::Resource;
use crate::repository::CropRepository;
use crate::repository::FarmRepository;
use crate::repository::PlantedRepository;
use crate::repository::ProducerRepository;
use crate::repository::Repository;

/// A connected application. Created by [`AgroApp::connect`], released by [`AgroApp::close`].
#[derive(Debug)]
#[fxstruct(sync, no_new, default(off), get)]
pub struct AgroApp {
    cache:     Arc<CacheStore>,
    store:     Arc<SeaOrmStore>,
    producers: ProducerRepository,
    farms:     FarmRepository,
    crops:     CropRepository,
    planted:   PlantedRepository,
    dashboard: Dashboard,
}

impl AgroApp {
    /// Open the configured database and cache.
    ///
    /// An unreachable cache is not an error: the application then runs directly against the database.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let driver = open_driver(config).await?;
        driver.configure().await?;
        info!("Connected to {} database", driver.name());

        let store = SeaOrmStore::from_driver(driver.as_ref());
        if config.migrate {
            store.migrate().await?;
        }

        let backend: Arc<dyn CacheBackend> = if config.memory_cache {
            Arc::new(MemoryBackend::new(config.memory_capacity))
        }
        else {
            Arc::new(RedisBackend::from_host(
                &config.redis_host,
                config.redis_port,
                config.redis_timeout(),
            )?)
        };

        Ok(Self::assemble(store, backend, config.list_ttl(), config.dashboard_ttl()).await)
    }

    /// Wire an already opened store with a cache backend.
    pub async fn assemble(
        store: SeaOrmStore,
        backend: Arc<dyn CacheBackend>,
        list_ttl: Duration,
        dashboard_ttl: Duration,
    ) -> Self {
        let cache = Arc::new(CacheStore::new(backend));
        cache.connect().await;

        let store = Arc::new(store);

        Self {
            producers: ProducerRepository::new(cache.clone(), store.clone(), list_ttl),
            farms: FarmRepository::new(cache.clone(), store.clone(), list_ttl),
            crops: CropRepository::new(cache.clone(), store.clone(), list_ttl),
            planted: PlantedRepository::new(cache.clone(), store.clone(), list_ttl),
            dashboard: Dashboard::new(cache.clone(), store.clone(), dashboard_ttl),
            cache,
            store,
        }
    }

    /// Read any resource by its name, as used in cache keys.
    #[instrument(level = "trace", skip(self))]
    pub async fn show(&self, resource: &str, id: Uuid) -> Result<Value, AppError> {
        match resource {
            "producer" => show_one(&self.producers, id).await,
            "farm" => show_one(&self.farms, id).await,
            "crop" => show_one(&self.crops, id).await,
            "planted" => show_one(&self.planted, id).await,
            _ => Err(AppError::UnknownResource(resource.to_string())),
        }
    }

    /// Drop cache entries matching a glob pattern. Returns the number of entries removed.
    pub async fn purge(&self, pattern: &str) -> u64 {
        let removed = self.cache.delete_by_pattern(pattern).await;
        info!("Purged {removed} cache entries matching '{pattern}'");
        removed
    }

    pub async fn close(self) -> Result<(), AppError> {
        self.cache.close().await;
        self.store.close().await?;
        info!("Application closed");
        Ok(())
    }
}

async fn show_one<R: Resource>(repo: &Repository<R>, id: Uuid) -> Result<Value, AppError> {
    let record = repo.read_by_id(id).await?;
    debug!(
        "{} {id} served from {}",
        R::NAME,
        if record.is_snapshot() { "cache" } else { "store" }
    );
    Ok(serde_json::to_value(record.into_inner())?)
}

async fn open_driver(config: &Config) -> Result<Box<dyn DatabaseDriver>, AppError> {
    match config.database() {
        #[cfg(feature = "sqlite")]
        DatabaseKind::Sqlite => Ok(Box::new(
            crate::db::driver::Sqlite::connect(&config.sqlite_path).await?,
        )),
        #[cfg(feature = "pg")]
        DatabaseKind::Pg => Ok(Box::new(
            crate::db::driver::Pg::connect(
                &config.pg_host,
                config.pg_port,
                &config.pg_user,
                &config.pg_password,
                &config.pg_db,
            )
            .await?,
        )),
        #[allow(unreachable_patterns)]
        DatabaseKind::Sqlite => Err(AppError::DriverDisabled("sqlite")),
        #[allow(unreachable_patterns)]
        DatabaseKind::Pg => Err(AppError::DriverDisabled("pg")),
    }
}
