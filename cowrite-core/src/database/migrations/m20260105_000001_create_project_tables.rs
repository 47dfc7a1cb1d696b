use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn fk_cascade(
    name: &str,
    from: (impl IntoIden + 'static, impl IntoIden + 'static),
    to: (impl IntoIden + 'static, impl IntoIden + 'static),
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to.0, to.1)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn fk_set_null(
    name: &str,
    from: (impl IntoIden + 'static, impl IntoIden + 'static),
    to: (impl IntoIden + 'static, impl IntoIden + 'static),
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to.0, to.1)
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

async fn index(
    manager: &SchemaManager<'_>,
    name: &str,
    table: impl IntoIden + 'static,
    col: impl IntoIden + 'static,
) -> Result<(), DbErr> {
    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(name)
                .table(table)
                .col(col)
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Projects::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Projects::Title).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::Genre).string())
                    .col(ColumnDef::new(Projects::CoverUrl).string())
                    .col(
                        ColumnDef::new(Projects::Settings)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Projects::WordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Projects::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Projects::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;
        index(manager, "idx_projects_owner_id", Projects::Table, Projects::OwnerId).await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectMembers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectMembers::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(ProjectMembers::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProjectMembers::Role)
                            .string()
                            .not_null()
                            .default("viewer"),
                    )
                    .col(
                        ColumnDef::new(ProjectMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_project_members_project_id",
                        (ProjectMembers::Table, ProjectMembers::ProjectId),
                        (Projects::Table, Projects::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_members_project_user")
                    .table(ProjectMembers::Table)
                    .col(ProjectMembers::ProjectId)
                    .col(ProjectMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Documents::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Documents::ParentId).uuid())
                    .col(
                        ColumnDef::new(Documents::Type)
                            .string()
                            .not_null()
                            .default("chapter"),
                    )
                    .col(ColumnDef::new(Documents::Title).string().not_null())
                    .col(ColumnDef::new(Documents::Content).text())
                    .col(
                        ColumnDef::new(Documents::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Documents::WordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Documents::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Documents::Notes).text())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_documents_project_id",
                        (Documents::Table, Documents::ProjectId),
                        (Projects::Table, Projects::Id),
                    ))
                    .foreign_key(&mut fk_set_null(
                        "fk_documents_parent_id",
                        (Documents::Table, Documents::ParentId),
                        (Documents::Table, Documents::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx_documents_project_id", Documents::Table, Documents::ProjectId).await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentVersions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DocumentVersions::DocumentId).uuid().not_null())
                    .col(ColumnDef::new(DocumentVersions::Content).text().not_null())
                    .col(ColumnDef::new(DocumentVersions::WordCount).integer())
                    .col(ColumnDef::new(DocumentVersions::VersionName).string())
                    .col(ColumnDef::new(DocumentVersions::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(DocumentVersions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_document_versions_document_id",
                        (DocumentVersions::Table, DocumentVersions::DocumentId),
                        (Documents::Table, Documents::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx_document_versions_document_id",
            DocumentVersions::Table,
            DocumentVersions::DocumentId,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentComments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DocumentComments::DocumentId).uuid().not_null())
                    .col(ColumnDef::new(DocumentComments::UserId).uuid())
                    .col(ColumnDef::new(DocumentComments::Content).text().not_null())
                    .col(ColumnDef::new(DocumentComments::Position).json())
                    .col(
                        ColumnDef::new(DocumentComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_document_comments_document_id",
                        (DocumentComments::Table, DocumentComments::DocumentId),
                        (Documents::Table, Documents::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx_document_comments_document_id",
            DocumentComments::Table,
            DocumentComments::DocumentId,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Characters::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Characters::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Characters::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Characters::Name).string().not_null())
                    .col(ColumnDef::new(Characters::Role).string())
                    .col(
                        ColumnDef::new(Characters::Profile)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Characters::Appearance)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Characters::Personality)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Characters::Backstory).text())
                    .col(ColumnDef::new(Characters::SpeechSample).text())
                    .col(ColumnDef::new(Characters::ImageUrl).string())
                    .col(
                        ColumnDef::new(Characters::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Characters::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_characters_project_id",
                        (Characters::Table, Characters::ProjectId),
                        (Projects::Table, Projects::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx_characters_project_id", Characters::Table, Characters::ProjectId).await?;

        manager
            .create_table(
                Table::create()
                    .table(CharacterStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CharacterStats::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CharacterStats::CharacterId).uuid().not_null())
                    .col(
                        ColumnDef::new(CharacterStats::TemplateType)
                            .string()
                            .not_null()
                            .default("custom"),
                    )
                    .col(
                        ColumnDef::new(CharacterStats::Stats)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(CharacterStats::EpisodeNum).integer())
                    .col(
                        ColumnDef::new(CharacterStats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_character_stats_character_id",
                        (CharacterStats::Table, CharacterStats::CharacterId),
                        (Characters::Table, Characters::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx_character_stats_character_id",
            CharacterStats::Table,
            CharacterStats::CharacterId,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorldSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorldSettings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WorldSettings::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(WorldSettings::ParentId).uuid())
                    .col(ColumnDef::new(WorldSettings::Category).string().not_null())
                    .col(ColumnDef::new(WorldSettings::Title).string().not_null())
                    .col(ColumnDef::new(WorldSettings::Content).text())
                    .col(
                        ColumnDef::new(WorldSettings::Metadata)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(WorldSettings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_world_settings_project_id",
                        (WorldSettings::Table, WorldSettings::ProjectId),
                        (Projects::Table, Projects::Id),
                    ))
                    .foreign_key(&mut fk_set_null(
                        "fk_world_settings_parent_id",
                        (WorldSettings::Table, WorldSettings::ParentId),
                        (WorldSettings::Table, WorldSettings::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx_world_settings_project_id",
            WorldSettings::Table,
            WorldSettings::ProjectId,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Relationships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Relationships::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Relationships::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Relationships::CharacterAId).uuid().not_null())
                    .col(ColumnDef::new(Relationships::CharacterBId).uuid().not_null())
                    .col(ColumnDef::new(Relationships::RelationType).string().not_null())
                    .col(ColumnDef::new(Relationships::Description).text())
                    .col(
                        ColumnDef::new(Relationships::IsBidirectional)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Relationships::Metadata)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Relationships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_relationships_project_id",
                        (Relationships::Table, Relationships::ProjectId),
                        (Projects::Table, Projects::Id),
                    ))
                    .foreign_key(&mut fk_cascade(
                        "fk_relationships_character_a_id",
                        (Relationships::Table, Relationships::CharacterAId),
                        (Characters::Table, Characters::Id),
                    ))
                    .foreign_key(&mut fk_cascade(
                        "fk_relationships_character_b_id",
                        (Relationships::Table, Relationships::CharacterBId),
                        (Characters::Table, Characters::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(
            manager,
            "idx_relationships_project_id",
            Relationships::Table,
            Relationships::ProjectId,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Plots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Plots::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Plots::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Plots::Title).string().not_null())
                    .col(ColumnDef::new(Plots::Description).text())
                    .col(
                        ColumnDef::new(Plots::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Plots::Metadata)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Plots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Plots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_plots_project_id",
                        (Plots::Table, Plots::ProjectId),
                        (Projects::Table, Projects::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx_plots_project_id", Plots::Table, Plots::ProjectId).await?;

        manager
            .create_table(
                Table::create()
                    .table(PlotPoints::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlotPoints::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PlotPoints::PlotId).uuid().not_null())
                    .col(ColumnDef::new(PlotPoints::DocumentId).uuid())
                    .col(ColumnDef::new(PlotPoints::Title).string().not_null())
                    .col(ColumnDef::new(PlotPoints::Description).text())
                    .col(
                        ColumnDef::new(PlotPoints::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlotPoints::Metadata)
                            .json()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(PlotPoints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_plot_points_plot_id",
                        (PlotPoints::Table, PlotPoints::PlotId),
                        (Plots::Table, Plots::Id),
                    ))
                    .foreign_key(&mut fk_set_null(
                        "fk_plot_points_document_id",
                        (PlotPoints::Table, PlotPoints::DocumentId),
                        (Documents::Table, Documents::Id),
                    ))
                    .to_owned(),
            )
            .await?;
        index(manager, "idx_plot_points_plot_id", PlotPoints::Table, PlotPoints::PlotId).await?;

        manager
            .create_table(
                Table::create()
                    .table(WritingGoals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WritingGoals::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WritingGoals::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(WritingGoals::UserId).uuid())
                    .col(ColumnDef::new(WritingGoals::GoalType).string().not_null())
                    .col(ColumnDef::new(WritingGoals::TargetWords).integer().not_null())
                    .col(
                        ColumnDef::new(WritingGoals::CurrentWords)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(WritingGoals::DueDate).date())
                    .col(
                        ColumnDef::new(WritingGoals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WritingGoals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_writing_goals_project_id",
                        (WritingGoals::Table, WritingGoals::ProjectId),
                        (Projects::Table, Projects::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResearchItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResearchItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ResearchItems::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(ResearchItems::Query).text().not_null())
                    .col(ColumnDef::new(ResearchItems::Result).json())
                    .col(
                        ColumnDef::new(ResearchItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_research_items_project_id",
                        (ResearchItems::Table, ResearchItems::ProjectId),
                        (Projects::Table, Projects::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Translations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Translations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Translations::DocumentId).uuid().not_null())
                    .col(ColumnDef::new(Translations::TargetLanguage).string().not_null())
                    .col(ColumnDef::new(Translations::Provider).string())
                    .col(ColumnDef::new(Translations::Content).text())
                    .col(
                        ColumnDef::new(Translations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_translations_document_id",
                        (Translations::Table, Translations::DocumentId),
                        (Documents::Table, Documents::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AudioAssets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AudioAssets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AudioAssets::DocumentId).uuid().not_null())
                    .col(ColumnDef::new(AudioAssets::Voice).string())
                    .col(ColumnDef::new(AudioAssets::Provider).string())
                    .col(ColumnDef::new(AudioAssets::Script).text())
                    .col(ColumnDef::new(AudioAssets::AudioUrl).string())
                    .col(
                        ColumnDef::new(AudioAssets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_audio_assets_document_id",
                        (AudioAssets::Table, AudioAssets::DocumentId),
                        (Documents::Table, Documents::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Storyboards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Storyboards::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Storyboards::DocumentId).uuid().not_null())
                    .col(ColumnDef::new(Storyboards::Provider).string())
                    .col(ColumnDef::new(Storyboards::Content).json())
                    .col(
                        ColumnDef::new(Storyboards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_storyboards_document_id",
                        (Storyboards::Table, Storyboards::DocumentId),
                        (Documents::Table, Documents::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReaderPredictions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReaderPredictions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReaderPredictions::DocumentId).uuid().not_null())
                    .col(ColumnDef::new(ReaderPredictions::Provider).string())
                    .col(ColumnDef::new(ReaderPredictions::Result).json())
                    .col(
                        ColumnDef::new(ReaderPredictions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut fk_cascade(
                        "fk_reader_predictions_document_id",
                        (ReaderPredictions::Table, ReaderPredictions::DocumentId),
                        (Documents::Table, Documents::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first so foreign keys never dangle mid-teardown
        manager
            .drop_table(Table::drop().table(ReaderPredictions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Storyboards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AudioAssets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Translations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ResearchItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WritingGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlotPoints::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Relationships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorldSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CharacterStats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Characters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DocumentComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DocumentVersions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    Genre,
    CoverUrl,
    Settings,
    WordCount,
    IsPublic,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum ProjectMembers {
    Table,
    Id,
    ProjectId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    ProjectId,
    ParentId,
    Type,
    Title,
    Content,
    OrderIndex,
    WordCount,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DocumentVersions {
    Table,
    Id,
    DocumentId,
    Content,
    WordCount,
    VersionName,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum DocumentComments {
    Table,
    Id,
    DocumentId,
    UserId,
    Content,
    Position,
    CreatedAt,
}

#[derive(Iden)]
enum Characters {
    Table,
    Id,
    ProjectId,
    Name,
    Role,
    Profile,
    Appearance,
    Personality,
    Backstory,
    SpeechSample,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CharacterStats {
    Table,
    Id,
    CharacterId,
    TemplateType,
    Stats,
    EpisodeNum,
    CreatedAt,
}

#[derive(Iden)]
enum WorldSettings {
    Table,
    Id,
    ProjectId,
    ParentId,
    Category,
    Title,
    Content,
    Metadata,
    CreatedAt,
}

#[derive(Iden)]
enum Relationships {
    Table,
    Id,
    ProjectId,
    #[iden = "character_a_id"]
    CharacterAId,
    #[iden = "character_b_id"]
    CharacterBId,
    RelationType,
    Description,
    IsBidirectional,
    Metadata,
    CreatedAt,
}

#[derive(Iden)]
enum Plots {
    Table,
    Id,
    ProjectId,
    Title,
    Description,
    OrderIndex,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PlotPoints {
    Table,
    Id,
    PlotId,
    DocumentId,
    Title,
    Description,
    OrderIndex,
    Metadata,
    CreatedAt,
}

#[derive(Iden)]
enum WritingGoals {
    Table,
    Id,
    ProjectId,
    UserId,
    GoalType,
    TargetWords,
    CurrentWords,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ResearchItems {
    Table,
    Id,
    ProjectId,
    Query,
    Result,
    CreatedAt,
}

#[derive(Iden)]
enum Translations {
    Table,
    Id,
    DocumentId,
    TargetLanguage,
    Provider,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum AudioAssets {
    Table,
    Id,
    DocumentId,
    Voice,
    Provider,
    Script,
    AudioUrl,
    CreatedAt,
}

#[derive(Iden)]
enum Storyboards {
    Table,
    Id,
    DocumentId,
    Provider,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum ReaderPredictions {
    Table,
    Id,
    DocumentId,
    Provider,
    Result,
    CreatedAt,
}
