use async_trait::async_trait;
use uuid::Uuid;

use super::Repository;
use crate::error::AgroError;
use crate::error::Result;
use crate::model::NewPlanted;
use crate::model::PlantedCulture;
use crate::model::PlantedDraft;
use crate::model::PlantedFilter;
use crate::model::PlantedPatch;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::Record;
use crate::types::RelationKind;
use crate::validation::require;

#[async_trait]
impl Resource for PlantedCulture {
    type Draft = PlantedDraft;
    type Filter = PlantedFilter;
    type Input = NewPlanted;
    type Patch = PlantedPatch;

    const NAME: &'static str = "planted";
    const RELATIONS: &'static [RelationKind] = &[RelationKind::Crop];

    fn id(&self) -> Uuid {
        self.id
    }

    async fn prepare_create(_store: &dyn PrimaryStore<Self>, input: NewPlanted) -> Result<PlantedDraft, AgroError> {
        require("name", &input.name)?;

        Ok(PlantedDraft {
            id:      None,
            name:    input.name,
            crop_id: input.crop_id,
        })
    }

    async fn prepare_update(
        _store: &dyn PrimaryStore<Self>,
        current: Self,
        patch: PlantedPatch,
    ) -> Result<PlantedDraft, AgroError> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }

        Ok(PlantedDraft {
            id:      Some(current.id),
            name:    patch.name.unwrap_or(current.name),
            crop_id: patch.crop_id.unwrap_or(current.crop_id),
        })
    }
}

impl Repository<PlantedCulture> {
    /// Every planted culture, ordered by name.
    pub async fn list_all(&self) -> Result<Vec<PlantedCulture>> {
        Ok(self.query(&PlantedFilter::All).await?.into_inner())
    }

    /// Case-insensitive.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<PlantedCulture>> {
        Ok(self
            .query(&PlantedFilter::NameContains(name.to_string()))
            .await?
            .into_inner())
    }

    /// Cultures planted in a crop, cached under `planted:crop:<id>`.
    pub async fn list_by_crop(&self, crop_id: Uuid) -> Result<Record<Vec<PlantedCulture>>> {
        self.query(&PlantedFilter::Crop(crop_id)).await
    }
}
