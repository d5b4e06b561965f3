#![cfg(any(test, feature = "test"))]
//! Test scaffolding: an in-memory primary store, instrumented cache backends, fixtures, and a [`Harness`] wiring
//! them into repositories.


use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::cache::CacheBackend;
use crate::cache::CacheStore;
use crate::cache::MemoryBackend;
use crate::dashboard::Dashboard;
use crate::dashboard::DEFAULT_DASHBOARD_TTL;
use crate::model::Crop;
use crate::model::Farm;
use crate::model::NewCrop;
use crate::model::NewPlanted;
use crate::model::PlantedCulture;
use crate::model::Producer;
use crate::repository::CropRepository;
use crate::repository::FarmRepository;
use crate::repository::PlantedRepository;
use crate::repository::ProducerRepository;
use crate::repository::DEFAULT_LIST_TTL;

use self::backend::GatedBackend;
use self::store::MemoryStore;

/// Everything a repository test needs, over an in-memory store and a gated in-memory cache.
#[derive(Debug)]
pub struct Harness {
    pub backend:   Arc<GatedBackend>,
    pub cache:     Arc<CacheStore>,
    pub store:     Arc<MemoryStore>,
    pub producers: ProducerRepository,
    pub farms:     FarmRepository,
    pub crops:     CropRepository,
    pub planted:   PlantedRepository,
    pub dashboard: Dashboard,
    seq:           AtomicU32,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_list_ttl(DEFAULT_LIST_TTL).await
    }

    pub async fn with_list_ttl(list_ttl: Duration) -> Self {
        Self::build(Arc::new(MemoryBackend::new(10_000)), list_ttl).await
    }

    /// Use a custom cache backend, e.g. [`FailingBackend`](backend::FailingBackend).
    pub async fn with_backend(inner: Arc<dyn CacheBackend>) -> Self {
        Self::build(inner, DEFAULT_LIST_TTL).await
    }

    async fn build(inner: Arc<dyn CacheBackend>, list_ttl: Duration) -> Self {
        let backend = Arc::new(GatedBackend::new(inner));
        let cache = Arc::new(CacheStore::new(backend.clone()));
        cache.connect().await;

        let store = Arc::new(MemoryStore::default());

        Self {
            producers: ProducerRepository::new(cache.clone(), store.clone(), list_ttl),
            farms: FarmRepository::new(cache.clone(), store.clone(), list_ttl),
            crops: CropRepository::new(cache.clone(), store.clone(), list_ttl),
            planted: PlantedRepository::new(cache.clone(), store.clone(), list_ttl),
            dashboard: Dashboard::new(cache.clone(), store.clone(), DEFAULT_DASHBOARD_TTL),
            seq: AtomicU32::new(0),
            backend,
            cache,
            store,
        }
    }

    /// A producer named "Ana" with a CPF not used by any other seeded producer.
    pub async fn seed_producer(&self) -> Producer {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        self.producers
            .create(fixtures::new_producer("Ana", &fixtures::cpf(n)))
            .await
            .expect("seed producer")
    }

    /// A farm of 100 with 60 arable and 30 of vegetation, owned by a freshly seeded producer.
    pub async fn seed_farm(&self) -> Farm {
        let producer = self.seed_producer().await;
        self.farms
            .create(fixtures::new_farm(producer.id, 100.0, 60.0, 30.0))
            .await
            .expect("seed farm")
    }

    pub async fn seed_crop(&self, farm_id: Uuid, name: &str, year: &str) -> Crop {
        self.crops
            .create(NewCrop {
                name: name.into(),
                year: year.into(),
                farm_id,
            })
            .await
            .expect("seed crop")
    }

    pub async fn seed_planted(&self, crop_id: Uuid, name: &str) -> PlantedCulture {
        self.planted
            .create(NewPlanted {
                name: name.into(),
                crop_id,
            })
            .await
            .expect("seed planted culture")
    }
}
