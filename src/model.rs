//! Resource types in the shape they are returned to callers and cached.
//!
//! Each resource comes with:
//!
//! - a _draft_, the flat row handed to [`PrimaryStore::save`](crate::primary::PrimaryStore::save);
//! - an _input_ for creation and a _patch_ for partial updates;
//! - a _filter_ describing the listing queries the primary store supports.
//!
//! The write policy of each resource (see [`Resource::prepare_create`] and [`Resource::prepare_update`]) lives
//! next to its repository.

pub mod crop;
pub mod farm;
pub mod planted;
pub mod producer;

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AgroError;
use crate::primary::PrimaryStore;
use crate::types::RelationKind;

pub use self::crop::Crop;
pub use self::crop::CropDraft;
pub use self::crop::CropFilter;
pub use self::crop::CropPatch;
pub use self::crop::NewCrop;
pub use self::farm::Farm;
pub use self::farm::FarmDraft;
pub use self::farm::FarmFilter;
pub use self::farm::FarmPatch;
pub use self::farm::FarmSummary;
pub use self::farm::NewFarm;
pub use self::planted::NewPlanted;
pub use self::planted::PlantedCulture;
pub use self::planted::PlantedDraft;
pub use self::planted::PlantedFilter;
pub use self::planted::PlantedPatch;
pub use self::producer::NewProducer;
pub use self::producer::Producer;
pub use self::producer::ProducerDraft;
pub use self::producer::ProducerFilter;
pub use self::producer::ProducerPatch;
pub use self::producer::ProducerSummary;

/// A record type managed by a cache-aside repository.
#[async_trait]
pub trait Resource: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + Sized + 'static {
    /// Name used for cache keys and error reporting.
    const NAME: &'static str;
    /// Relations embedded into the per-id response shape.
    const RELATIONS: &'static [RelationKind];

    type Draft: Debug + Send + Sync + 'static;
    type Input: Debug + Send + Sync + 'static;
    type Patch: Debug + Send + Sync + 'static;
    type Filter: Query + 'static;

    fn id(&self) -> Uuid;

    /// Validate a creation request and turn it into a draft with no id.
    async fn prepare_create(store: &dyn PrimaryStore<Self>, input: Self::Input) -> Result<Self::Draft, AgroError>;

    /// Merge a patch into the current state of a record. Invariants are checked against the resulting values.
    async fn prepare_update(
        store: &dyn PrimaryStore<Self>,
        current: Self,
        patch: Self::Patch,
    ) -> Result<Self::Draft, AgroError>;
}

/// A listing query.
pub trait Query: Debug + Send + Sync {
    /// Relation name and foreign id for queries keyed by a stable foreign identifier. Only those are cached.
    fn cache_slot(&self) -> Option<(&'static str, Uuid)> {
        None
    }

    /// An empty result of this query is reported as not found.
    fn requires_match(&self) -> bool {
        false
    }
}
