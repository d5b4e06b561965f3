//! # agro-cache
//!
//! Cache-aside record management for rural producers, their farms, the crops grown on those farms and the cultures
//! planted in each crop.
//!
//! The relational database is the source of truth. A key-value cache, either Redis or an in-process
//! [moka](https://crates.io/crates/moka) cache, sits in front of it and is never trusted over the database:
//!
//! - reading a record by id consults the cache first and populates it on a miss;
//! - writes go to the database first and then overwrite the cached copy;
//! - deletes remove the row and then the cached copy;
//! - lists selected by a parent id (crops of a farm, cultures of a crop, farms of a producer) are cached for a fixed
//!   time and are never invalidated by writes.
//!
//! The cache is best-effort. Any failure of the cache backend is logged and turns into a miss, so an outage slows the
//! application down but never fails a request.
//!
//! # Example
//!
//! ```ignore
//! let app = AgroApp::connect(&Config::load()).await?;
//!
//! let producer = app
//!     .producers()
//!     .create(NewProducer {
//!         name:            "Ana".into(),
//!         document_number: "123.456.789-09".into(),
//!         document_type:   DocumentType::Cpf,
//!     })
//!     .await?;
//!
//! // Served from the cache.
//! let record = app.producers().read_by_id(producer.id).await?;
//! assert!(record.is_snapshot());
//!
//! app.close().await?;
//! ```
//!
//! # Consistency
//!
//! There is no locking. Two concurrent updates of the same record may leave the cache holding the older one until the
//! next write, and an update validates against whatever copy it read. Deleting a parent cascades in the database
//! but not in the cache: cached children stay readable until they are overwritten or purged. These are accepted
//! trade-offs of the cache-aside pattern.

pub mod app;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod document;
pub mod error;
pub mod model;
pub mod primary;
pub mod repository;
pub mod telemetry;
pub mod test;
pub mod types;
pub mod validation;

#[doc(inline)]
pub use app::AgroApp;
#[doc(inline)]
pub use cache::CacheStore;
#[doc(inline)]
pub use error::AgroError;
#[doc(inline)]
pub use repository::Repository;

pub mod prelude {
    pub use crate::app::AgroApp;
    pub use crate::cache::CacheBackend;
    pub use crate::cache::CacheStore;
    pub use crate::dashboard::Dashboard;
    pub use crate::error::AgroError;
    pub use crate::error::Result;
    pub use crate::error::ValidationError;
    pub use crate::model::*;
    pub use crate::primary::PrimaryStore;
    pub use crate::repository::CropRepository;
    pub use crate::repository::FarmRepository;
    pub use crate::repository::PlantedRepository;
    pub use crate::repository::ProducerRepository;
    pub use crate::repository::Repository;
    pub use crate::types::*;
}
