use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::QueryOrder;

use super::crop;
use super::name_contains;
use crate::db::vanished;
use crate::db::SeaOrmStore;
use crate::error::StoreError;
use crate::model::Crop;
use crate::model::PlantedCulture;
use crate::model::PlantedDraft;
use crate::model::PlantedFilter;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::RelationKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "planted_cultures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:      Uuid,
    pub name:    String,
    #[sea_orm(indexed)]
    pub crop_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::crop::Entity",
        from = "Column::CropId",
        to = "super::crop::Column::Id",
        on_delete = "Cascade"
    )]
    Crop,
}

impl Related<super::crop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    fn into_planted(self, crop: Option<Crop>) -> PlantedCulture {
        PlantedCulture {
            id: self.id,
            name: self.name,
            crop_id: self.crop_id,
            crop,
        }
    }
}

impl SeaOrmStore {
    async fn load_planted(&self, row: Model, relations: &[RelationKind]) -> Result<PlantedCulture, StoreError> {
        let crop = if relations.contains(&RelationKind::Crop) {
            crop::Entity::find_by_id(row.crop_id)
                .one(self.connection())
                .await?
                .map(crop::Model::into_crop)
        }
        else {
            None
        };

        Ok(row.into_planted(crop))
    }
}

#[async_trait]
impl PrimaryStore<PlantedCulture> for SeaOrmStore {
    async fn find_by_id(&self, id: Uuid, relations: &[RelationKind]) -> Result<Option<PlantedCulture>, StoreError> {
        match Entity::find_by_id(id).one(self.connection()).await? {
            Some(row) => Ok(Some(self.load_planted(row, relations).await?)),
            None => Ok(None),
        }
    }

    async fn find_many(&self, filter: &PlantedFilter) -> Result<Vec<PlantedCulture>, StoreError> {
        let query = match filter {
            PlantedFilter::All => Entity::find(),
            PlantedFilter::NameContains(name) => Entity::find().filter(name_contains(Column::Name, name)),
            PlantedFilter::Crop(crop_id) => Entity::find().filter(Column::CropId.eq(*crop_id)),
        };

        Ok(query
            .order_by_asc(Column::Name)
            .all(self.connection())
            .await?
            .into_iter()
            .map(|row| row.into_planted(None))
            .collect())
    }

    async fn save(&self, draft: PlantedDraft) -> Result<PlantedCulture, StoreError> {
        let db = self.connection();

        if crop::Entity::find_by_id(draft.crop_id).one(db).await?.is_none() {
            return Err(StoreError::MissingReference {
                resource: Crop::NAME,
                id:       draft.crop_id,
            });
        }

        let row = ActiveModel {
            id:      Set(draft.id.unwrap_or_else(Uuid::new_v4)),
            name:    Set(draft.name),
            crop_id: Set(draft.crop_id),
        };

        let saved = match draft.id {
            Some(id) => row.update(db).await.map_err(vanished(PlantedCulture::NAME, id))?,
            None => row.insert(db).await?,
        };

        self.load_planted(saved, PlantedCulture::RELATIONS).await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(Entity::delete_by_id(id).exec(self.connection()).await?.rows_affected)
    }
}
