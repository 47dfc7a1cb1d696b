use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MediaAssets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MediaAssets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MediaAssets::UserId).uuid().not_null())
                    .col(ColumnDef::new(MediaAssets::ProjectId).uuid())
                    .col(ColumnDef::new(MediaAssets::OriginalName).string())
                    .col(ColumnDef::new(MediaAssets::MimeType).string().not_null())
                    .col(ColumnDef::new(MediaAssets::Size).big_integer().not_null())
                    .col(ColumnDef::new(MediaAssets::StoragePath).string().not_null())
                    .col(ColumnDef::new(MediaAssets::Url).string().not_null())
                    .col(
                        ColumnDef::new(MediaAssets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_media_assets_project_id")
                            .from(MediaAssets::Table, MediaAssets::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_media_assets_project_id")
                    .table(MediaAssets::Table)
                    .col(MediaAssets::ProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MediaAssets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MediaAssets {
    Table,
    Id,
    UserId,
    ProjectId,
    OriginalName,
    MimeType,
    Size,
    StoragePath,
    Url,
    CreatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}
