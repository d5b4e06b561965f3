use sea_orm_migration::prelude::*;

use super::crop::Crops;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m0004_planted_cultures"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlantedCultures::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlantedCultures::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PlantedCultures::Name).string().not_null())
                    .col(ColumnDef::new(PlantedCultures::CropId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-planted_cultures-crop_id")
                            .from(PlantedCultures::Table, PlantedCultures::CropId)
                            .to(Crops::Table, Crops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-planted_cultures-crop_id")
                    .table(PlantedCultures::Table)
                    .col(PlantedCultures::CropId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlantedCultures::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PlantedCultures {
    Table,
    Id,
    Name,
    CropId,
}
