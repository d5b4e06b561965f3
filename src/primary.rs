use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::Resource;
use crate::types::RelationKind;

/// Relational persistence for one resource type.
///
/// The cache-aside repositories consume this interface and never talk to a database directly. The crate ships a
/// sea-orm implementation in [`db`](crate::db); tests use an in-memory one.
#[async_trait]
pub trait PrimaryStore<R>: Send + Sync + 'static
where
    R: Resource,
{
    /// Load a record with the requested relations embedded. Relations not asked for are left empty.
    async fn find_by_id(&self, id: Uuid, relations: &[RelationKind]) -> Result<Option<R>, StoreError>;

    /// Records matching a filter, with no relations loaded.
    async fn find_many(&self, filter: &R::Filter) -> Result<Vec<R>, StoreError>;

    /// Insert a draft without an id (a new v4 UUID is assigned) or update an existing row. The returned record has
    /// [`Resource::RELATIONS`] loaded.
    ///
    /// A foreign key pointing to a missing row results in [`StoreError::MissingReference`].
    async fn save(&self, draft: R::Draft) -> Result<R, StoreError>;

    /// Delete a row, returning the number of affected rows.
    async fn delete(&self, id: Uuid) -> Result<u64, StoreError>;
}
