//! Database drivers.
#[cfg(feature = "pg")]
pub mod pg;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::fmt::Debug;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::error::StoreError;

#[cfg(feature = "pg")]
pub use self::pg::Pg;
#[cfg(feature = "sqlite")]
pub use self::sqlite::Sqlite;

/// A connected database of some kind.
#[async_trait]
pub trait DatabaseDriver: Debug + Sync + Send + 'static {
    /// Return driver name.
    fn name(&self) -> &'static str;
    fn connection(&self) -> DatabaseConnection;
    /// Apply session-level settings. See corresponding driver implementation for details.
    async fn configure(&self) -> Result<(), StoreError>;
}
