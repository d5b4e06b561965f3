use thiserror::Error;
use uuid::Uuid;

use crate::types::DocumentType;

pub type Result<T, E = AgroError> = std::result::Result<T, E>;

/// Errors surfaced to the callers of repositories and the dashboard.
#[derive(Debug, Error)]
pub enum AgroError {
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("primary store failure: {0}")]
    Infrastructure(#[source] StoreError),
}

impl AgroError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        AgroError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, AgroError::NotFound { .. })
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            AgroError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<StoreError> for AgroError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingReference { resource, id } => AgroError::not_found(resource, id),
            StoreError::DuplicateDocument(document) => ValidationError::DuplicateDocument(document).into(),
            other => AgroError::Infrastructure(other),
        }
    }
}

/// Client-caused failures, detected before anything is written.
///
/// The one exception is [`DuplicateDocument`](Self::DuplicateDocument) when two writes of the same document race: the
/// loser is rejected by the store's unique index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid {kind} document '{document}'")]
    InvalidDocument { kind: DocumentType, document: String },

    #[error("document '{0}' is already registered")]
    DuplicateDocument(String),

    #[error("arable area ({arable}) plus vegetation area ({vegetation}) exceeds total area ({total})")]
    AreaInvariantViolated { total: f64, arable: f64, vegetation: f64 },

    #[error("missing required field '{0}'")]
    MissingRequiredField(&'static str),

    #[error("area '{field}' must be a non-negative number, got {value}")]
    InvalidArea { field: &'static str, value: f64 },

    #[error("year must be in YYYY format, got '{0}'")]
    InvalidYear(String),

    #[error("start year {start} is after end year {end}")]
    InvalidYearRange { start: u16, end: u16 },
}

/// Failures reported by a primary store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),

    #[error("referenced {resource} '{id}' does not exist")]
    MissingReference { resource: &'static str, id: Uuid },

    /// A unique index rejected the document.
    #[error("document '{0}' is already stored")]
    DuplicateDocument(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a cache backend. They never leave [`CacheStore`](crate::cache::CacheStore).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("cache operation timed out")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("cache backend is not connected")]
    NotConnected,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Pattern(#[from] globset::Error),

    #[error("{0}")]
    Backend(String),
}

/// Startup and administrative failures of an [`AgroApp`](crate::app::AgroApp).
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Agro(#[from] AgroError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("database driver '{0}' is not compiled in")]
    DriverDisabled(&'static str),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),
}
