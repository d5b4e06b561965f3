//! Schema migrations, applied in order.
pub mod crop;
pub mod farm;
pub mod planted;
pub mod producer;

use sea_orm_migration::prelude::*;

pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(producer::Migration),
            Box::new(farm::Migration),
            Box::new(crop::Migration),
            Box::new(planted::Migration),
        ]
    }
}
