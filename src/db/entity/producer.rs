use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::QueryOrder;
use sea_orm::SqlErr;

use super::farm;
use super::name_contains;
use crate::db::vanished;
use crate::db::SeaOrmStore;
use crate::error::StoreError;
use crate::model::FarmSummary;
use crate::model::Producer;
use crate::model::ProducerDraft;
use crate::model::ProducerFilter;
use crate::model::ProducerSummary;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::DocumentType;
use crate::types::RelationKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "producers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:              Uuid,
    pub name:            String,
    #[sea_orm(unique, indexed)]
    pub document_number: String,
    // "CPF" or "CNPJ"
    pub document_type:   String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::farm::Entity")]
    Farm,
}

impl Related<super::farm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn document_type(&self) -> Result<DocumentType, StoreError> {
        self.document_type.parse().map_err(|_| {
            StoreError::Corrupt(format!(
                "producer {} has unknown document type '{}'",
                self.id, self.document_type
            ))
        })
    }

    pub fn into_producer(self, farms: Vec<FarmSummary>) -> Result<Producer, StoreError> {
        Ok(Producer {
            document_type: self.document_type()?,
            id: self.id,
            name: self.name,
            document_number: self.document_number,
            farms,
        })
    }

    pub fn summary(&self) -> Result<ProducerSummary, StoreError> {
        Ok(ProducerSummary {
            id:              self.id,
            name:            self.name.clone(),
            document_number: self.document_number.clone(),
            document_type:   self.document_type()?,
        })
    }
}

impl SeaOrmStore {
    async fn producer_farms(&self, id: Uuid) -> Result<Vec<FarmSummary>, StoreError> {
        Ok(farm::Entity::find()
            .filter(farm::Column::ProducerId.eq(id))
            .order_by_asc(farm::Column::Name)
            .all(self.connection())
            .await?
            .into_iter()
            .map(farm::Model::summary)
            .collect())
    }
}

// Two writes of one document may both pass the repository's uniqueness check; the index rejects the second.
fn save_failed(document: String, id: Option<Uuid>) -> impl FnOnce(DbErr) -> StoreError {
    move |err| match (err.sql_err(), id) {
        (Some(SqlErr::UniqueConstraintViolation(_)), _) => StoreError::DuplicateDocument(document),
        (_, Some(id)) => vanished(Producer::NAME, id)(err),
        (_, None) => StoreError::Db(err),
    }
}

#[async_trait]
impl PrimaryStore<Producer> for SeaOrmStore {
    async fn find_by_id(&self, id: Uuid, relations: &[RelationKind]) -> Result<Option<Producer>, StoreError> {
        let Some(row) = Entity::find_by_id(id).one(self.connection()).await?
        else {
            return Ok(None);
        };

        let farms = if relations.contains(&RelationKind::Farms) {
            self.producer_farms(id).await?
        }
        else {
            Vec::new()
        };

        Ok(Some(row.into_producer(farms)?))
    }

    async fn find_many(&self, filter: &ProducerFilter) -> Result<Vec<Producer>, StoreError> {
        let query = match filter {
            ProducerFilter::All => Entity::find(),
            ProducerFilter::NameContains(name) => Entity::find().filter(name_contains(Column::Name, name)),
            ProducerFilter::DocumentType(kind) => Entity::find().filter(Column::DocumentType.eq(kind.to_string())),
            ProducerFilter::Document { kind, number } => Entity::find()
                .filter(Column::DocumentType.eq(kind.to_string()))
                .filter(Column::DocumentNumber.eq(number.as_str())),
            ProducerFilter::DocumentNumber(number) => Entity::find().filter(Column::DocumentNumber.eq(number.as_str())),
        };

        query
            .order_by_asc(Column::Name)
            .all(self.connection())
            .await?
            .into_iter()
            .map(|row| row.into_producer(Vec::new()))
            .collect()
    }

    async fn save(&self, draft: ProducerDraft) -> Result<Producer, StoreError> {
        let db = self.connection();
        let failed = save_failed(draft.document_number.clone(), draft.id);
        let row = ActiveModel {
            id:              Set(draft.id.unwrap_or_else(Uuid::new_v4)),
            name:            Set(draft.name),
            document_number: Set(draft.document_number),
            document_type:   Set(draft.document_type.to_string()),
        };

        let saved = if draft.id.is_some() {
            row.update(db).await.map_err(failed)?
        }
        else {
            row.insert(db).await.map_err(failed)?
        };

        let farms = self.producer_farms(saved.id).await?;
        saved.into_producer(farms)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(Entity::delete_by_id(id).exec(self.connection()).await?.rows_affected)
    }
}
