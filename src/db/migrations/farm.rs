use sea_orm_migration::prelude::*;

use super::producer::Producers;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m0002_farms"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Farms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Farms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Farms::Name).string().not_null())
                    .col(ColumnDef::new(Farms::City).string().not_null())
                    .col(ColumnDef::new(Farms::State).string().not_null())
                    .col(ColumnDef::new(Farms::TotalArea).double().not_null())
                    .col(ColumnDef::new(Farms::ArableArea).double().not_null())
                    .col(ColumnDef::new(Farms::VegetationArea).double().not_null())
                    .col(ColumnDef::new(Farms::ProducerId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-farms-producer_id")
                            .from(Farms::Table, Farms::ProducerId)
                            .to(Producers::Table, Producers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-farms-producer_id")
                    .table(Farms::Table)
                    .col(Farms::ProducerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-farms-state-city")
                    .table(Farms::Table)
                    .col(Farms::State)
                    .col(Farms::City)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Farms::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub(super) enum Farms {
    Table,
    Id,
    Name,
    City,
    State,
    TotalArea,
    ArableArea,
    VegetationArea,
    ProducerId,
}
