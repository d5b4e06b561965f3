use async_trait::async_trait;
use uuid::Uuid;

use super::Repository;
use crate::document::normalize;
use crate::document::validate_document;
use crate::error::AgroError;
use crate::error::Result;
use crate::error::ValidationError;
use crate::model::NewProducer;
use crate::model::Producer;
use crate::model::ProducerDraft;
use crate::model::ProducerFilter;
use crate::model::ProducerPatch;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::DocumentType;
use crate::types::RelationKind;
use crate::validation::require;

// `exclude` is the producer being updated; it may keep its own document.
async fn ensure_unique(store: &dyn PrimaryStore<Producer>, digits: &str, exclude: Option<Uuid>) -> Result<()> {
    let holders = store
        .find_many(&ProducerFilter::DocumentNumber(digits.to_string()))
        .await?;

    if holders.iter().any(|p| Some(p.id) != exclude) {
        return Err(ValidationError::DuplicateDocument(digits.to_string()).into());
    }

    Ok(())
}

#[async_trait]
impl Resource for Producer {
    type Draft = ProducerDraft;
    type Filter = ProducerFilter;
    type Input = NewProducer;
    type Patch = ProducerPatch;

    const NAME: &'static str = "producer";
    const RELATIONS: &'static [RelationKind] = &[RelationKind::Farms];

    fn id(&self) -> Uuid {
        self.id
    }

    async fn prepare_create(store: &dyn PrimaryStore<Self>, input: NewProducer) -> Result<ProducerDraft, AgroError> {
        let name = require("name", &input.name)?.to_string();
        let document_number = validate_document(input.document_type, &input.document_number)?;
        ensure_unique(store, &document_number, None).await?;

        Ok(ProducerDraft {
            id: None,
            name,
            document_number,
            document_type: input.document_type,
        })
    }

    async fn prepare_update(
        store: &dyn PrimaryStore<Self>,
        current: Self,
        patch: ProducerPatch,
    ) -> Result<ProducerDraft, AgroError> {
        let name = match patch.name {
            Some(name) => require("name", &name)?.to_string(),
            None => current.name,
        };

        // A changed type must still match the number, so the document is re-validated even when only one of them is
        // patched.
        let document_type = patch.document_type.unwrap_or(current.document_type);
        let raw = patch.document_number.unwrap_or(current.document_number);
        let document_number = validate_document(document_type, &raw)?;
        ensure_unique(store, &document_number, Some(current.id)).await?;

        Ok(ProducerDraft {
            id: Some(current.id),
            name,
            document_number,
            document_type,
        })
    }
}

impl Repository<Producer> {
    /// Every producer, ordered by name.
    pub async fn list_all(&self) -> Result<Vec<Producer>> {
        Ok(self.query(&ProducerFilter::All).await?.into_inner())
    }

    /// Case-insensitive.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Producer>> {
        Ok(self
            .query(&ProducerFilter::NameContains(name.to_string()))
            .await?
            .into_inner())
    }

    pub async fn find_by_document_type(&self, kind: DocumentType) -> Result<Vec<Producer>> {
        Ok(self.query(&ProducerFilter::DocumentType(kind)).await?.into_inner())
    }

    /// The document may be given in any formatting.
    pub async fn find_by_document(&self, kind: DocumentType, raw: &str) -> Result<Vec<Producer>> {
        let filter = ProducerFilter::Document {
            kind,
            number: normalize(raw),
        };
        Ok(self.query(&filter).await?.into_inner())
    }
}
