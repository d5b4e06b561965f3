//! Aggregate views over all farms.
//!
//! Each view is cached under a fixed `dashboard:*` key with a TTL and is never invalidated by writes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fieldx::fxstruct;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::instrument;

use crate::cache::keys;
use crate::cache::CacheStore;
use crate::error::AgroError;
use crate::error::Result;
use crate::error::StoreError;

pub const DEFAULT_DASHBOARD_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCount {
    pub state: String,
    pub value: u64,
}

/// Number of distinct farms growing a culture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultureCount {
    pub name:  String,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LandUseKind {
    Arable,
    Vegetation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandUse {
    pub land_use: LandUseKind,
    pub value:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub by_state:    Vec<StateCount>,
    pub by_culture:  Vec<CultureCount>,
    pub by_land_use: Vec<LandUse>,
}

/// Where the aggregates are computed.
#[async_trait]
pub trait DashboardSource: Send + Sync + 'static {
    async fn farms_by_state(&self) -> Result<Vec<StateCount>, StoreError>;
    async fn farms_by_culture(&self) -> Result<Vec<CultureCount>, StoreError>;
    /// Sums of arable and vegetation areas over all farms.
    async fn area_totals(&self) -> Result<(f64, f64), StoreError>;
}

#[derive(Clone)]
#[fxstruct(sync, no_new, default(off), get)]
pub struct Dashboard {
    cache: Arc<CacheStore>,

    #[fieldx(get(off))]
    source: Arc<dyn DashboardSource>,

    /// Lifetime of each cached view.
    #[fieldx(get(copy))]
    ttl: Duration,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(cache: Arc<CacheStore>, source: Arc<dyn DashboardSource>, ttl: Duration) -> Self {
        Self { cache, source, ttl }
    }

    async fn cached<T, F>(&self, key: &str, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, StoreError>>,
    {
        if let Some(view) = self.cache.get_json::<T>(key).await {
            debug!("{key} served from cache");
            return Ok(view);
        }

        let view = load.await.map_err(|e| {
            error!("{key} aggregation failed: {e}");
            AgroError::from(e)
        })?;
        self.cache.set_json(key, &view, Some(self.ttl)).await;
        Ok(view)
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn by_state(&self) -> Result<Vec<StateCount>> {
        self.cached(keys::DASHBOARD_BY_STATE, self.source.farms_by_state()).await
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn by_culture(&self) -> Result<Vec<CultureCount>> {
        self.cached(keys::DASHBOARD_BY_CULTURE, self.source.farms_by_culture())
            .await
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn by_land_use(&self) -> Result<Vec<LandUse>> {
        self.cached(keys::DASHBOARD_BY_LAND_USE, async {
            let (arable, vegetation) = self.source.area_totals().await?;
            Ok(vec![
                LandUse {
                    land_use: LandUseKind::Arable,
                    value:    arable,
                },
                LandUse {
                    land_use: LandUseKind::Vegetation,
                    value:    vegetation,
                },
            ])
        })
        .await
    }

    /// All three views, fetched concurrently.
    pub async fn all(&self) -> Result<DashboardData> {
        let (by_state, by_culture, by_land_use) = tokio::try_join!(self.by_state(), self.by_culture(), self.by_land_use())?;

        Ok(DashboardData {
            by_state,
            by_culture,
            by_land_use,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures;
    use crate::test::Harness;

    #[tokio::test]
    async fn views() {
        let h = Harness::new().await;
        let p = h.seed_producer().await;

        let mut mt = Vec::new();
        for (state, arable, vegetation) in [("MT", 50.0, 20.0), ("MT", 30.0, 10.0), ("GO", 10.0, 5.0)] {
            let mut input = fixtures::new_farm(p.id, 100.0, arable, vegetation);
            input.state = state.into();
            let farm = h.farms.create(input).await.unwrap();
            if state == "MT" {
                mt.push(farm);
            }
        }

        // Two crops of the same farm growing soy count the farm once.
        let c1 = h.seed_crop(mt[0].id, "Safra 1", "2024").await;
        let c2 = h.seed_crop(mt[0].id, "Safra 2", "2025").await;
        let c3 = h.seed_crop(mt[1].id, "Safra 1", "2025").await;
        h.seed_planted(c1.id, "Soja").await;
        h.seed_planted(c2.id, "Soja").await;
        h.seed_planted(c3.id, "Soja").await;
        h.seed_planted(c3.id, "Milho").await;

        let data = h.dashboard.all().await.unwrap();
        assert_eq!(
            data.by_state,
            vec![
                StateCount {
                    state: "GO".into(),
                    value: 1,
                },
                StateCount {
                    state: "MT".into(),
                    value: 2,
                },
            ]
        );
        assert_eq!(
            data.by_culture,
            vec![
                CultureCount {
                    name:  "Milho".into(),
                    value: 1,
                },
                CultureCount {
                    name:  "Soja".into(),
                    value: 2,
                },
            ]
        );
        assert_eq!(data.by_land_use[0].value, 90.0);
        assert_eq!(data.by_land_use[1].value, 35.0);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["byLandUse"][0]["landUse"], "arable");
        assert_eq!(json["byState"][0]["state"], "GO");
    }

    #[tokio::test]
    async fn views_are_not_invalidated_by_writes() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;

        assert_eq!(h.dashboard.ttl(), DEFAULT_DASHBOARD_TTL);
        let before = h.dashboard.by_state().await.unwrap();
        assert_eq!(before[0].value, 1);

        let mut input = fixtures::new_farm(farm.producer_id, 10.0, 1.0, 1.0);
        input.state = farm.state.clone();
        h.farms.create(input).await.unwrap();

        assert_eq!(h.dashboard.by_state().await.unwrap(), before);
        assert!(h.cache.get(keys::DASHBOARD_BY_STATE).await.is_some());
    }

    #[tokio::test]
    async fn store_outage() {
        let h = Harness::new().await;
        h.store.set_unreachable(true);
        let err = h.dashboard.all().await.unwrap_err();
        assert!(matches!(err, AgroError::Infrastructure(StoreError::Unavailable(_))));
    }
}
