use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::Condition;
use sea_orm::QueryOrder;

use super::farm;
use super::name_contains;
use crate::db::vanished;
use crate::db::SeaOrmStore;
use crate::error::StoreError;
use crate::model::Crop;
use crate::model::CropDraft;
use crate::model::CropFilter;
use crate::model::Farm;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::RelationKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:      Uuid,
    pub name:    String,
    pub year:    String,
    #[sea_orm(indexed)]
    pub farm_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::farm::Entity",
        from = "Column::FarmId",
        to = "super::farm::Column::Id",
        on_delete = "Cascade"
    )]
    Farm,
    #[sea_orm(has_many = "super::planted::Entity")]
    Planted,
}

impl Related<super::farm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl Related<super::planted::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Planted.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_crop(self) -> Crop {
        Crop {
            id:      self.id,
            name:    self.name,
            year:    self.year,
            farm_id: self.farm_id,
        }
    }
}

#[async_trait]
impl PrimaryStore<Crop> for SeaOrmStore {
    async fn find_by_id(&self, id: Uuid, _relations: &[RelationKind]) -> Result<Option<Crop>, StoreError> {
        Ok(Entity::find_by_id(id)
            .one(self.connection())
            .await?
            .map(Model::into_crop))
    }

    async fn find_many(&self, filter: &CropFilter) -> Result<Vec<Crop>, StoreError> {
        let condition = match filter {
            CropFilter::All => Condition::all(),
            CropFilter::NameContains(name) => Condition::all().add(name_contains(Column::Name, name)),
            CropFilter::Year { year, farm_id } => Condition::all()
                .add(Column::Year.eq(year.as_str()))
                .add_option(farm_id.map(|farm_id| Column::FarmId.eq(farm_id))),
            // Years are four digits, so text order is numeric order.
            CropFilter::YearRange { start, end } => {
                Condition::all().add(Column::Year.between(format!("{start:04}"), format!("{end:04}")))
            }
            CropFilter::Farm(farm_id) => return self.farm_crops(*farm_id).await,
        };

        Ok(Entity::find()
            .filter(condition)
            .order_by_asc(Column::Name)
            .all(self.connection())
            .await?
            .into_iter()
            .map(Model::into_crop)
            .collect())
    }

    async fn save(&self, draft: CropDraft) -> Result<Crop, StoreError> {
        let db = self.connection();

        if farm::Entity::find_by_id(draft.farm_id).one(db).await?.is_none() {
            return Err(StoreError::MissingReference {
                resource: Farm::NAME,
                id:       draft.farm_id,
            });
        }

        let row = ActiveModel {
            id:      Set(draft.id.unwrap_or_else(Uuid::new_v4)),
            name:    Set(draft.name),
            year:    Set(draft.year),
            farm_id: Set(draft.farm_id),
        };

        let saved = match draft.id {
            Some(id) => row.update(db).await.map_err(vanished(Crop::NAME, id))?,
            None => row.insert(db).await?,
        };

        Ok(saved.into_crop())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(Entity::delete_by_id(id).exec(self.connection()).await?.rows_affected)
    }
}
