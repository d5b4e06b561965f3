use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m0001_producers"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Producers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Producers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Producers::Name).string().not_null())
                    .col(
                        ColumnDef::new(Producers::DocumentNumber)
                            .string_len(14)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Producers::DocumentType).string_len(4).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-producers-name")
                    .table(Producers::Table)
                    .col(Producers::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Producers::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub(super) enum Producers {
    Table,
    Id,
    Name,
    DocumentNumber,
    DocumentType,
}
