use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::FarmSummary;
use super::Query;
use crate::types::DocumentType;

/// A rural producer, identified by a CPF or CNPJ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub id:              Uuid,
    pub name:            String,
    /// Digits only.
    pub document_number: String,
    pub document_type:   DocumentType,
    #[serde(default)]
    pub farms:           Vec<FarmSummary>,
}

/// Producer as embedded into a farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerSummary {
    pub id:              Uuid,
    pub name:            String,
    pub document_number: String,
    pub document_type:   DocumentType,
}

impl From<&Producer> for ProducerSummary {
    fn from(p: &Producer) -> Self {
        Self {
            id:              p.id,
            name:            p.name.clone(),
            document_number: p.document_number.clone(),
            document_type:   p.document_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProducerDraft {
    pub id:              Option<Uuid>,
    pub name:            String,
    pub document_number: String,
    pub document_type:   DocumentType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProducer {
    pub name:            String,
    pub document_number: String,
    pub document_type:   DocumentType,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProducerPatch {
    pub name:            Option<String>,
    pub document_number: Option<String>,
    pub document_type:   Option<DocumentType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProducerFilter {
    All,
    /// Case-insensitive substring of the name.
    NameContains(String),
    DocumentType(DocumentType),
    Document { kind: DocumentType, number: String },
    /// Exact match on the normalized document, regardless of its type.
    DocumentNumber(String),
}

impl Query for ProducerFilter {}
