use async_trait::async_trait;
use uuid::Uuid;

use super::Repository;
use crate::error::AgroError;
use crate::error::Result;
use crate::error::ValidationError;
use crate::model::Crop;
use crate::model::CropDraft;
use crate::model::CropFilter;
use crate::model::CropPatch;
use crate::model::NewCrop;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::Record;
use crate::types::RelationKind;
use crate::validation::check_year;
use crate::validation::require;

#[async_trait]
impl Resource for Crop {
    type Draft = CropDraft;
    type Filter = CropFilter;
    type Input = NewCrop;
    type Patch = CropPatch;

    const NAME: &'static str = "crop";
    const RELATIONS: &'static [RelationKind] = &[];

    fn id(&self) -> Uuid {
        self.id
    }

    async fn prepare_create(_store: &dyn PrimaryStore<Self>, input: NewCrop) -> Result<CropDraft, AgroError> {
        require("name", &input.name)?;
        check_year(require("year", &input.year)?)?;

        Ok(CropDraft {
            id:      None,
            name:    input.name,
            year:    input.year,
            farm_id: input.farm_id,
        })
    }

    async fn prepare_update(
        _store: &dyn PrimaryStore<Self>,
        current: Self,
        patch: CropPatch,
    ) -> Result<CropDraft, AgroError> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }
        if let Some(year) = &patch.year {
            check_year(require("year", year)?)?;
        }

        Ok(CropDraft {
            id:      Some(current.id),
            name:    patch.name.unwrap_or(current.name),
            year:    patch.year.unwrap_or(current.year),
            farm_id: patch.farm_id.unwrap_or(current.farm_id),
        })
    }
}

impl Repository<Crop> {
    /// Every crop, ordered by name.
    pub async fn list_all(&self) -> Result<Vec<Crop>> {
        Ok(self.query(&CropFilter::All).await?.into_inner())
    }

    /// Case-insensitive.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Crop>> {
        Ok(self.query(&CropFilter::NameContains(name.to_string())).await?.into_inner())
    }

    pub async fn search_by_year(&self, year: &str, farm_id: Option<Uuid>) -> Result<Vec<Crop>> {
        check_year(year)?;
        let filter = CropFilter::Year {
            year: year.to_string(),
            farm_id,
        };
        Ok(self.query(&filter).await?.into_inner())
    }

    /// Crops with `start <= year <= end`.
    pub async fn search_by_year_range(&self, start: &str, end: &str) -> Result<Vec<Crop>> {
        let start = check_year(start)?;
        let end = check_year(end)?;
        if start > end {
            return Err(ValidationError::InvalidYearRange { start, end }.into());
        }
        Ok(self.query(&CropFilter::YearRange { start, end }).await?.into_inner())
    }

    /// Crops of a farm, newest year first. Cached under `crop:farm:<id>`; a farm with no crops is reported as not
    /// found.
    pub async fn list_by_farm(&self, farm_id: Uuid) -> Result<Record<Vec<Crop>>> {
        self.query(&CropFilter::Farm(farm_id)).await
    }
}
