use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::Condition;
use sea_orm::QueryOrder;

use super::crop;
use super::name_contains;
use super::producer;
use crate::db::vanished;
use crate::db::SeaOrmStore;
use crate::error::StoreError;
use crate::model::Crop;
use crate::model::Farm;
use crate::model::FarmDraft;
use crate::model::FarmFilter;
use crate::model::FarmSummary;
use crate::model::Producer;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::RelationKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:              Uuid,
    pub name:            String,
    pub city:            String,
    pub state:           String,
    pub total_area:      f64,
    pub arable_area:     f64,
    pub vegetation_area: f64,
    #[sea_orm(indexed)]
    pub producer_id:     Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::producer::Entity",
        from = "Column::ProducerId",
        to = "super::producer::Column::Id",
        on_delete = "Cascade"
    )]
    Producer,
    #[sea_orm(has_many = "super::crop::Entity")]
    Crop,
}

impl Related<super::producer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Producer.def()
    }
}

impl Related<super::crop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn summary(self) -> FarmSummary {
        FarmSummary {
            id:              self.id,
            name:            self.name,
            city:            self.city,
            state:           self.state,
            total_area:      self.total_area,
            arable_area:     self.arable_area,
            vegetation_area: self.vegetation_area,
        }
    }

    pub fn into_farm(self) -> Farm {
        Farm {
            id:              self.id,
            name:            self.name,
            city:            self.city,
            state:           self.state,
            total_area:      self.total_area,
            arable_area:     self.arable_area,
            vegetation_area: self.vegetation_area,
            producer_id:     self.producer_id,
            producer:        None,
            crops:           Vec::new(),
        }
    }
}

impl SeaOrmStore {
    async fn load_farm(&self, row: Model, relations: &[RelationKind]) -> Result<Farm, StoreError> {
        let db = self.connection();
        let producer_id = row.producer_id;
        let mut farm = row.into_farm();

        if relations.contains(&RelationKind::Producer) {
            farm.producer = match producer::Entity::find_by_id(producer_id).one(db).await? {
                Some(p) => Some(p.summary()?),
                None => None,
            };
        }

        if relations.contains(&RelationKind::Crops) {
            farm.crops = self.farm_crops(farm.id).await?;
        }

        Ok(farm)
    }

    // Newest year first.
    pub(crate) async fn farm_crops(&self, farm_id: Uuid) -> Result<Vec<Crop>, StoreError> {
        Ok(crop::Entity::find()
            .filter(crop::Column::FarmId.eq(farm_id))
            .order_by_desc(crop::Column::Year)
            .order_by_asc(crop::Column::Name)
            .all(self.connection())
            .await?
            .into_iter()
            .map(crop::Model::into_crop)
            .collect())
    }
}

#[async_trait]
impl PrimaryStore<Farm> for SeaOrmStore {
    async fn find_by_id(&self, id: Uuid, relations: &[RelationKind]) -> Result<Option<Farm>, StoreError> {
        match Entity::find_by_id(id).one(self.connection()).await? {
            Some(row) => Ok(Some(self.load_farm(row, relations).await?)),
            None => Ok(None),
        }
    }

    async fn find_many(&self, filter: &FarmFilter) -> Result<Vec<Farm>, StoreError> {
        let condition = match filter {
            FarmFilter::All => Condition::all(),
            FarmFilter::NameContains(name) => Condition::all().add(name_contains(Column::Name, name)),
            FarmFilter::Location { state, city } => Condition::all()
                .add(Column::State.eq(state.as_str()))
                .add_option(city.as_deref().map(|city| Column::City.eq(city))),
            FarmFilter::Producer(producer_id) => Condition::all().add(Column::ProducerId.eq(*producer_id)),
        };

        Ok(Entity::find()
            .filter(condition)
            .order_by_asc(Column::Name)
            .all(self.connection())
            .await?
            .into_iter()
            .map(Model::into_farm)
            .collect())
    }

    async fn save(&self, draft: FarmDraft) -> Result<Farm, StoreError> {
        let db = self.connection();

        if producer::Entity::find_by_id(draft.producer_id).one(db).await?.is_none() {
            return Err(StoreError::MissingReference {
                resource: Producer::NAME,
                id:       draft.producer_id,
            });
        }

        let row = ActiveModel {
            id:              Set(draft.id.unwrap_or_else(Uuid::new_v4)),
            name:            Set(draft.name),
            city:            Set(draft.city),
            state:           Set(draft.state),
            total_area:      Set(draft.total_area),
            arable_area:     Set(draft.arable_area),
            vegetation_area: Set(draft.vegetation_area),
            producer_id:     Set(draft.producer_id),
        };

        let saved = match draft.id {
            Some(id) => row.update(db).await.map_err(vanished(Farm::NAME, id))?,
            None => row.insert(db).await?,
        };

        self.load_farm(saved, Farm::RELATIONS).await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(Entity::delete_by_id(id).exec(self.connection()).await?.rows_affected)
    }
}
