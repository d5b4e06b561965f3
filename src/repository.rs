//! Cache-aside repositories.
//!
//! A [`Repository`] is the only writer of both the primary store and the cache for its resource. The protocol:
//!
//! - reads consult the cache first; a miss loads from the store and populates `"<resource>:<id>"` with no TTL;
//! - writes validate, save to the store, then overwrite the per-id entry with the saved record;
//! - deletes remove the row and the per-id entry;
//! - queries keyed by a foreign id (e.g. all crops of a farm) are cached under `"<resource>:<relation>:<id>"` for a
//!   fixed TTL. They are never invalidated by writes and expire on their own.
//!
//! There is no locking across operations. Concurrent writes to the same id may leave the cache holding an older
//! version than the store, and an update may base its checks on a stale snapshot. Both self-heal only through the next
//! write or, for list entries, the TTL.

pub mod crop;
pub mod farm;
pub mod planted;
pub mod producer;

use std::sync::Arc;
use std::time::Duration;

use fieldx::fxstruct;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::warn;
use uuid::Uuid;

use crate::cache::keys;
use crate::cache::CacheStore;
use crate::error::AgroError;
use crate::error::Result;
use crate::error::StoreError;
use crate::model::Crop;
use crate::model::Farm;
use crate::model::PlantedCulture;
use crate::model::Producer;
use crate::model::Query;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::Record;

pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(3600);

pub type ProducerRepository = Repository<Producer>;
pub type FarmRepository = Repository<Farm>;
pub type CropRepository = Repository<Crop>;
pub type PlantedRepository = Repository<PlantedCulture>;

#[derive(Clone)]
#[fxstruct(sync, no_new, default(off), get)]
pub struct Repository<R>
where
    R: Resource,
{
    cache: Arc<CacheStore>,
    store: Arc<dyn PrimaryStore<R>>,

    /// Lifetime of cached relation lists.
    #[fieldx(get(copy))]
    list_ttl: Duration,
}

impl<R> std::fmt::Debug for Repository<R>
where
    R: Resource,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("resource", &R::NAME)
            .field("cache", &self.cache)
            .field("list_ttl", &self.list_ttl)
            .finish()
    }
}

impl<R> Repository<R>
where
    R: Resource,
{
    pub fn new(cache: Arc<CacheStore>, store: Arc<dyn PrimaryStore<R>>, list_ttl: Duration) -> Self {
        Self { cache, store, list_ttl }
    }

    /// Cache key of a single record.
    #[inline]
    pub fn key_of(id: Uuid) -> String {
        keys::record(R::NAME, id)
    }

    fn store_failure(&self, op: &'static str, err: StoreError) -> AgroError {
        let err = AgroError::from(err);
        if let AgroError::Infrastructure(_) = err {
            error!("[{}] {op} failed: {err}", R::NAME);
        }
        else if let Some(verr) = err.validation() {
            warn!("[{}] {op} rejected by store: {verr}", R::NAME);
        }
        err
    }

    fn rejected(&self, op: &'static str, err: AgroError) -> AgroError {
        if let Some(verr) = err.validation() {
            warn!("[{}] {op} rejected: {verr}", R::NAME);
        }
        err
    }

    /// Read a record. A cache hit is returned as a [`Record::Snapshot`] without consulting the store.
    #[instrument(level = "trace", skip(self), fields(resource = R::NAME))]
    pub async fn read_by_id(&self, id: Uuid) -> Result<Record<R>> {
        let key = Self::key_of(id);

        if let Some(snapshot) = self.cache.get_json::<R>(&key).await {
            debug!("[{}] cache hit for {id}", R::NAME);
            return Ok(Record::Snapshot(snapshot));
        }

        debug!("[{}] cache miss for {id}, loading from store", R::NAME);
        let Some(loaded) = self
            .store
            .find_by_id(id, R::RELATIONS)
            .await
            .map_err(|e| self.store_failure("read", e))?
        else {
            return Err(AgroError::not_found(R::NAME, id));
        };

        self.cache.set_json(&key, &loaded, None).await;
        Ok(Record::Fresh(loaded))
    }

    #[instrument(level = "trace", skip(self), fields(resource = R::NAME))]
    pub async fn create(&self, input: R::Input) -> Result<R> {
        let draft = R::prepare_create(self.store.as_ref(), input)
            .await
            .map_err(|e| self.rejected("create", e))?;

        let saved = self.store.save(draft).await.map_err(|e| self.store_failure("create", e))?;
        self.cache.set_json(&Self::key_of(saved.id()), &saved, None).await;

        info!("[{}] created {}", R::NAME, saved.id());
        Ok(saved)
    }

    /// Apply a patch. The current state comes through [`read_by_id`](Self::read_by_id) and thus may be a stale
    /// snapshot; whatever it holds for the fields not in the patch is written back to the store.
    #[instrument(level = "trace", skip(self), fields(resource = R::NAME))]
    pub async fn update(&self, id: Uuid, patch: R::Patch) -> Result<R> {
        let current = self.read_by_id(id).await?.into_inner();

        let draft = R::prepare_update(self.store.as_ref(), current, patch)
            .await
            .map_err(|e| self.rejected("update", e))?;

        let saved = self.store.save(draft).await.map_err(|e| self.store_failure("update", e))?;
        self.cache.set_json(&Self::key_of(saved.id()), &saved, None).await;

        info!("[{}] updated {id}", R::NAME);
        Ok(saved)
    }

    /// Delete a record and its per-id cache entry. List entries which include the record are left untouched.
    #[instrument(level = "trace", skip(self), fields(resource = R::NAME))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.read_by_id(id).await?;

        let affected = self.store.delete(id).await.map_err(|e| self.store_failure("delete", e))?;
        self.cache.delete(&Self::key_of(id)).await;

        if affected == 0 {
            warn!("[{}] {id} vanished before it could be deleted", R::NAME);
            return Err(AgroError::not_found(R::NAME, id));
        }

        info!("[{}] deleted {id}", R::NAME);
        Ok(())
    }

    /// Run a listing query. Only queries with a [cache slot](Query::cache_slot) use the cache, and only non-empty
    /// results are stored.
    #[instrument(level = "trace", skip(self), fields(resource = R::NAME))]
    pub async fn query(&self, filter: &R::Filter) -> Result<Record<Vec<R>>> {
        let slot = filter.cache_slot();
        let key = slot.map(|(relation, foreign_id)| keys::relation(R::NAME, relation, foreign_id));

        if let Some(key) = &key {
            if let Some(snapshot) = self.cache.get_json::<Vec<R>>(key).await {
                debug!("[{}] cache hit for {key}", R::NAME);
                return Ok(Record::Snapshot(snapshot));
            }
        }

        let found = self
            .store
            .find_many(filter)
            .await
            .map_err(|e| self.store_failure("query", e))?;

        if found.is_empty() {
            if filter.requires_match() {
                let what = slot.map_or_else(|| format!("{filter:?}"), |(rel, fid)| format!("{rel} {fid}"));
                debug!("[{}] nothing found for {what}", R::NAME);
                return Err(AgroError::not_found(R::NAME, what));
            }
        }
        else if let Some(key) = &key {
            self.cache.set_json(key, &found, Some(self.list_ttl())).await;
        }

        Ok(Record::Fresh(found))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use uuid::Uuid;

    use super::*;
    use crate::error::ValidationError;
    use crate::model::FarmPatch;
    use crate::model::ProducerPatch;
    use crate::test::backend::FailingBackend;
    use crate::test::fixtures;
    use crate::test::Harness;

    #[tokio::test]
    async fn read_after_write() {
        let h = Harness::new().await;
        let created = h
            .producers
            .create(fixtures::new_producer("Ana", "123.456.789-09"))
            .await
            .unwrap();

        let key = ProducerRepository::key_of(created.id);
        assert_eq!(h.cache.get_json::<Producer>(&key).await, Some(created.clone()));

        let reads = h.store.reads();
        let read = h.producers.read_by_id(created.id).await.unwrap();
        assert!(read.is_snapshot());
        assert_eq!(*read, created);
        // Served from the cache alone.
        assert_eq!(h.store.reads(), reads);
    }

    #[tokio::test]
    async fn read_through_populates_cache() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        let key = FarmRepository::key_of(farm.id);

        h.cache.delete(&key).await;
        let read = h.farms.read_by_id(farm.id).await.unwrap();
        assert!(read.is_fresh());
        assert_eq!(*read, farm);
        assert_eq!(h.cache.get_json::<Farm>(&key).await, Some(farm.clone()));

        assert!(h.farms.read_by_id(farm.id).await.unwrap().is_snapshot());
    }

    #[tokio::test]
    async fn read_after_delete() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        let crop = h.seed_crop(farm.id, "Safra", "2025").await;

        h.crops.delete(crop.id).await.unwrap();

        assert!(h.cache.get(&CropRepository::key_of(crop.id)).await.is_none());
        let err = h.crops.read_by_id(crop.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(h.crops.delete(crop.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn unknown_id() {
        let h = Harness::new().await;
        let id = Uuid::new_v4();
        assert!(h.producers.read_by_id(id).await.unwrap_err().is_not_found());
        assert!(h
            .producers
            .update(id, ProducerPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
        // Misses are not cached.
        assert!(h.cache.get(&ProducerRepository::key_of(id)).await.is_none());
    }

    #[tokio::test]
    async fn failed_validation_leaves_no_trace() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        let cached = h.cache.get(&FarmRepository::key_of(farm.id)).await;

        let err = h
            .farms
            .update(
                farm.id,
                FarmPatch {
                    arable_area: Some(80.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.validation(), Some(ValidationError::AreaInvariantViolated { .. })));

        assert_eq!(h.store.farm(farm.id).unwrap().arable_area, 60.0);
        assert_eq!(h.cache.get(&FarmRepository::key_of(farm.id)).await, cached);
    }

    #[tokio::test]
    async fn cache_outage_is_invisible() {
        let h = Harness::with_backend(Arc::new(FailingBackend)).await;

        let farm = h.seed_farm().await;
        let read = h.farms.read_by_id(farm.id).await.unwrap();
        assert!(read.is_fresh());
        assert_eq!(*read, farm);

        let crop = h.seed_crop(farm.id, "Safra", "2025").await;
        assert!(h.crops.list_by_farm(farm.id).await.unwrap().is_fresh());
        assert!(h.crops.list_by_farm(farm.id).await.unwrap().is_fresh());

        h.crops.delete(crop.id).await.unwrap();
        assert!(h.crops.read_by_id(crop.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn store_outage_is_infrastructure() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        h.store.set_unreachable(true);

        // Still served from the cache.
        assert!(h.farms.read_by_id(farm.id).await.unwrap().is_snapshot());

        let err = h
            .farms
            .update(
                farm.id,
                FarmPatch {
                    name: Some("Boa Esperança".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgroError::Infrastructure(StoreError::Unavailable(_))));

        h.cache.delete(&FarmRepository::key_of(farm.id)).await;
        let err = h.farms.read_by_id(farm.id).await.unwrap_err();
        assert!(matches!(err, AgroError::Infrastructure(_)));
    }

    #[tokio::test]
    async fn snapshot_keeps_embedded_relations() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;

        h.producers
            .update(
                farm.producer_id,
                ProducerPatch {
                    name: Some("Ana Maria".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let snapshot = h.farms.read_by_id(farm.id).await.unwrap();
        assert!(snapshot.is_snapshot());
        assert_eq!(snapshot.producer.as_ref().unwrap().name, "Ana");

        let fresh = PrimaryStore::<Farm>::find_by_id(h.store.as_ref(), farm.id, Farm::RELATIONS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fresh.producer.as_ref().unwrap().name, "Ana Maria");
        assert_ne!(*snapshot, fresh);

        // A write to the farm itself refreshes the embedded producer.
        let updated = h.farms.update(farm.id, FarmPatch::default()).await.unwrap();
        assert_eq!(updated.producer.unwrap().name, "Ana Maria");
    }

    #[tokio::test]
    async fn cascaded_children_stay_cached() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        let crop = h.seed_crop(farm.id, "Safra", "2025").await;

        h.farms.delete(farm.id).await.unwrap();
        assert!(h.store.crop(crop.id).is_none());

        // The crop's own entry was never touched.
        let stale = h.crops.read_by_id(crop.id).await.unwrap();
        assert!(stale.is_snapshot());

        // Deleting it finds no row, still drops the entry.
        assert!(h.crops.delete(crop.id).await.unwrap_err().is_not_found());
        assert!(h.crops.read_by_id(crop.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_survives_child_delete() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        let doomed = h.seed_crop(farm.id, "Safra 1", "2023").await;
        h.seed_crop(farm.id, "Safra 2", "2024").await;
        h.seed_crop(farm.id, "Safra 3", "2025").await;

        assert_eq!(h.crops.list_by_farm(farm.id).await.unwrap().len(), 3);

        h.crops.delete(doomed.id).await.unwrap();

        let listed = h.crops.list_by_farm(farm.id).await.unwrap();
        assert!(listed.is_snapshot());
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().any(|c| c.id == doomed.id));
        assert!(h.crops.read_by_id(doomed.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_expires() {
        let h = Harness::with_list_ttl(Duration::from_millis(300)).await;
        let farm = h.seed_farm().await;
        assert_eq!(h.crops.list_ttl(), Duration::from_millis(300));
        let doomed = h.seed_crop(farm.id, "Safra 1", "2023").await;
        h.seed_crop(farm.id, "Safra 2", "2024").await;

        assert_eq!(h.crops.list_by_farm(farm.id).await.unwrap().len(), 2);
        h.crops.delete(doomed.id).await.unwrap();
        assert_eq!(h.crops.list_by_farm(farm.id).await.unwrap().len(), 2);

        tokio::time::sleep(Duration::from_millis(600)).await;

        let listed = h.crops.list_by_farm(farm.id).await.unwrap();
        assert!(listed.is_fresh());
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn write_write_race() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        let key = FarmRepository::key_of(farm.id);
        let id = farm.id;

        let mut gate = h.backend.hold_next_set(key.clone());
        let farms = h.farms.clone();
        let first = tokio::spawn(async move {
            farms
                .update(
                    id,
                    FarmPatch {
                        name: Some("U1".into()),
                        ..Default::default()
                    },
                )
                .await
        });

        // U1 is in the store, its cache write is held.
        gate.reached().await;
        assert_eq!(h.store.farm(farm.id).unwrap().name, "U1");

        h.farms
            .update(
                farm.id,
                FarmPatch {
                    name: Some("U2".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        gate.release();
        first.await.unwrap().unwrap();

        assert_eq!(h.store.farm(farm.id).unwrap().name, "U2");
        let cached = h.farms.read_by_id(farm.id).await.unwrap();
        assert!(cached.is_snapshot());
        assert_eq!(cached.name, "U1");
    }

    #[tokio::test]
    async fn update_based_on_stale_read() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        assert_eq!((farm.arable_area, farm.vegetation_area), (60.0, 30.0));
        let key = FarmRepository::key_of(farm.id);
        let id = farm.id;

        let mut gate = h.backend.hold_next_set(key);
        let farms = h.farms.clone();
        let first = tokio::spawn(async move {
            farms
                .update(
                    id,
                    FarmPatch {
                        arable_area: Some(70.0),
                        ..Default::default()
                    },
                )
                .await
        });
        gate.reached().await;

        // Checks 60 + 35 against the cached snapshot while the store already holds 70.
        let second = h
            .farms
            .update(
                farm.id,
                FarmPatch {
                    vegetation_area: Some(35.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!((second.arable_area, second.vegetation_area), (60.0, 35.0));

        gate.release();
        let first = first.await.unwrap().unwrap();
        assert_eq!((first.arable_area, first.vegetation_area), (70.0, 30.0));

        // The first update is lost in the store, yet it is what the cache ends up with.
        let stored = h.store.farm(farm.id).unwrap();
        assert_eq!((stored.arable_area, stored.vegetation_area), (60.0, 35.0));
        let cached = h.farms.read_by_id(farm.id).await.unwrap();
        assert_eq!((cached.arable_area, cached.vegetation_area), (70.0, 30.0));
    }

    #[tokio::test]
    async fn vanished_row_on_delete() {
        let h = Harness::new().await;
        let p = h.seed_producer().await;

        assert!(h.store.remove_producer(p.id));
        assert!(h.producers.delete(p.id).await.unwrap_err().is_not_found());
        assert!(h.cache.get(&ProducerRepository::key_of(p.id)).await.is_none());
    }
}
