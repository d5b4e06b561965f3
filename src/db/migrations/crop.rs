use sea_orm_migration::prelude::*;

use super::farm::Farms;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m0003_crops"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Crops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Crops::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Crops::Name).string().not_null())
                    .col(ColumnDef::new(Crops::Year).string_len(4).not_null())
                    .col(ColumnDef::new(Crops::FarmId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-crops-farm_id")
                            .from(Crops::Table, Crops::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-crops-farm_id")
                    .table(Crops::Table)
                    .col(Crops::FarmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-crops-year")
                    .table(Crops::Table)
                    .col(Crops::Year)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Crops::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub(super) enum Crops {
    Table,
    Id,
    Name,
    Year,
    FarmId,
}
