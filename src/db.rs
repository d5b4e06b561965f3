//! sea-orm backed primary store.
//!
//! [`SeaOrmStore`] implements [`PrimaryStore`](crate::primary::PrimaryStore) for all four resources and
//! [`DashboardSource`](crate::dashboard::DashboardSource). Tables are created by the [`migrations`]; a database is
//! opened through one of the [drivers](driver).

pub mod driver;
pub mod entity;
pub mod migrations;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use async_trait::async_trait;
use fieldx::fxstruct;
use sea_orm::sea_query::Expr;
use sea_orm::DatabaseConnection;
use sea_orm::DbErr;
use sea_orm::EntityTrait;
use sea_orm::JoinType;
use sea_orm::QueryOrder;
use sea_orm::QuerySelect;
use sea_orm::RelationTrait;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use uuid::Uuid;

use self::entity::crop;
use self::entity::farm;
use self::entity::planted;
use crate::dashboard::CultureCount;
use crate::dashboard::DashboardSource;
use crate::dashboard::StateCount;
use crate::error::StoreError;

pub use self::driver::DatabaseDriver;
pub use self::migrations::Migrator;

#[derive(Debug, Clone)]
#[fxstruct(sync, no_new, default(off), get)]
pub struct SeaOrmStore {
    connection: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    pub fn from_driver(driver: &dyn DatabaseDriver) -> Self {
        Self::new(driver.connection())
    }

    /// Bring the schema up to date.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        Migrator::up(&self.connection, None).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Close the connection pool shared by every clone of this store.
    pub async fn close(&self) -> Result<(), StoreError> {
        Ok(self.connection.clone().close().await?)
    }
}

// An update of a row which is not there.
pub(crate) fn vanished(resource: &'static str, id: Uuid) -> impl FnOnce(DbErr) -> StoreError {
    move |err| match err {
        DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => StoreError::MissingReference { resource, id },
        err => StoreError::Db(err),
    }
}

#[async_trait]
impl DashboardSource for SeaOrmStore {
    async fn farms_by_state(&self) -> Result<Vec<StateCount>, StoreError> {
        let rows: Vec<(String, i64)> = farm::Entity::find()
            .select_only()
            .column(farm::Column::State)
            .column_as(Expr::col(farm::Column::Id).count(), "value")
            .group_by(farm::Column::State)
            .order_by_asc(farm::Column::State)
            .into_tuple()
            .all(&self.connection)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(state, value)| StateCount {
                state,
                value: value as u64,
            })
            .collect())
    }

    async fn farms_by_culture(&self) -> Result<Vec<CultureCount>, StoreError> {
        let rows: Vec<(String, Uuid)> = planted::Entity::find()
            .select_only()
            .column(planted::Column::Name)
            .column(crop::Column::FarmId)
            .join(JoinType::InnerJoin, planted::Relation::Crop.def())
            .into_tuple()
            .all(&self.connection)
            .await?;

        // A farm growing a culture in several crops counts once.
        let mut farms = BTreeMap::<String, BTreeSet<Uuid>>::new();
        for (name, farm_id) in rows {
            farms.entry(name).or_default().insert(farm_id);
        }

        Ok(farms
            .into_iter()
            .map(|(name, farms)| CultureCount {
                name,
                value: farms.len() as u64,
            })
            .collect())
    }

    async fn area_totals(&self) -> Result<(f64, f64), StoreError> {
        let totals: Option<(Option<f64>, Option<f64>)> = farm::Entity::find()
            .select_only()
            .column_as(Expr::col(farm::Column::ArableArea).sum(), "arable")
            .column_as(Expr::col(farm::Column::VegetationArea).sum(), "vegetation")
            .into_tuple()
            .one(&self.connection)
            .await?;

        let (arable, vegetation) = totals.unwrap_or_default();
        Ok((arable.unwrap_or(0.0), vegetation.unwrap_or(0.0)))
    }
}
