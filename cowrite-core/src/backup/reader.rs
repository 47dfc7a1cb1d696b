use std::collections::{BTreeSet, HashSet};

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;
use uuid::Uuid;

use super::scanner::ReferenceScanner;
use crate::database::entities::{
    audio_assets, character_stats, characters, document_comments, document_versions, documents,
    media_assets, plot_points, plots, projects, reader_predictions, relationships,
    research_items, storyboards, translations, world_settings, writing_goals,
};

/// Upper bound on ids per `IN (...)` clause. Keeps well under SQLite's
/// bound-parameter limit.
pub const PARENT_CHUNK_SIZE: usize = 500;

/// Every record captured by one project export.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    pub project: projects::Model,
    pub documents: Vec<documents::Model>,
    pub document_versions: Vec<document_versions::Model>,
    pub document_comments: Vec<document_comments::Model>,
    pub characters: Vec<characters::Model>,
    pub character_stats: Vec<character_stats::Model>,
    pub world_settings: Vec<world_settings::Model>,
    pub relationships: Vec<relationships::Model>,
    pub plots: Vec<plots::Model>,
    pub plot_points: Vec<plot_points::Model>,
    pub writing_goals: Vec<writing_goals::Model>,
    pub research_items: Vec<research_items::Model>,
    pub translations: Vec<translations::Model>,
    pub audio_assets: Vec<audio_assets::Model>,
    pub storyboards: Vec<storyboards::Model>,
    pub reader_predictions: Vec<reader_predictions::Model>,
    /// Project-owned media plus media referenced from content.
    pub media: Vec<media_assets::Model>,
}

impl ProjectGraph {
    /// Media ids embedded in the project's cover, description and settings,
    /// in character portraits and profiles, and in document bodies.
    pub fn referenced_media_ids(&self) -> BTreeSet<Uuid> {
        let mut scanner = ReferenceScanner::new();
        scanner.scan_opt(self.project.cover_url.as_deref());
        scanner.scan_opt(self.project.description.as_deref());
        scanner.scan_json(&self.project.settings);
        for character in &self.characters {
            scanner.scan_opt(character.image_url.as_deref());
            scanner.scan_opt(character.backstory.as_deref());
            scanner.scan_json(&character.profile);
            scanner.scan_json(&character.appearance);
        }
        for document in &self.documents {
            scanner.scan_opt(document.content.as_deref());
        }
        scanner.finish()
    }
}

/// Loads rows of `E` whose `column` is one of `parents`, one query per chunk.
async fn find_by_parents<E, C>(
    conn: &C,
    column: E::Column,
    parents: &[Uuid],
) -> Result<Vec<E::Model>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut rows = Vec::new();
    for chunk in parents.chunks(PARENT_CHUNK_SIZE) {
        let mut batch = E::find()
            .filter(column.is_in(chunk.iter().copied()))
            .all(conn)
            .await?;
        rows.append(&mut batch);
    }
    Ok(rows)
}

/// Loads the full graph of `project`. The caller has already checked access.
pub async fn read_project_graph<C>(conn: &C, project: projects::Model) -> Result<ProjectGraph, DbErr>
where
    C: ConnectionTrait,
{
    let project_ids = [project.id];

    let documents =
        find_by_parents::<documents::Entity, _>(conn, documents::Column::ProjectId, &project_ids)
            .await?;
    let document_ids: Vec<Uuid> = documents.iter().map(|d| d.id).collect();

    let document_versions = find_by_parents::<document_versions::Entity, _>(
        conn,
        document_versions::Column::DocumentId,
        &document_ids,
    )
    .await?;
    let document_comments = find_by_parents::<document_comments::Entity, _>(
        conn,
        document_comments::Column::DocumentId,
        &document_ids,
    )
    .await?;
    let translations = find_by_parents::<translations::Entity, _>(
        conn,
        translations::Column::DocumentId,
        &document_ids,
    )
    .await?;
    let audio_assets = find_by_parents::<audio_assets::Entity, _>(
        conn,
        audio_assets::Column::DocumentId,
        &document_ids,
    )
    .await?;
    let storyboards = find_by_parents::<storyboards::Entity, _>(
        conn,
        storyboards::Column::DocumentId,
        &document_ids,
    )
    .await?;
    let reader_predictions = find_by_parents::<reader_predictions::Entity, _>(
        conn,
        reader_predictions::Column::DocumentId,
        &document_ids,
    )
    .await?;

    let characters =
        find_by_parents::<characters::Entity, _>(conn, characters::Column::ProjectId, &project_ids)
            .await?;
    let character_ids: Vec<Uuid> = characters.iter().map(|c| c.id).collect();
    let character_stats = find_by_parents::<character_stats::Entity, _>(
        conn,
        character_stats::Column::CharacterId,
        &character_ids,
    )
    .await?;

    let world_settings = find_by_parents::<world_settings::Entity, _>(
        conn,
        world_settings::Column::ProjectId,
        &project_ids,
    )
    .await?;
    let relationships = find_by_parents::<relationships::Entity, _>(
        conn,
        relationships::Column::ProjectId,
        &project_ids,
    )
    .await?;

    let plots =
        find_by_parents::<plots::Entity, _>(conn, plots::Column::ProjectId, &project_ids).await?;
    let plot_ids: Vec<Uuid> = plots.iter().map(|p| p.id).collect();
    let plot_points =
        find_by_parents::<plot_points::Entity, _>(conn, plot_points::Column::PlotId, &plot_ids)
            .await?;

    let writing_goals = find_by_parents::<writing_goals::Entity, _>(
        conn,
        writing_goals::Column::ProjectId,
        &project_ids,
    )
    .await?;
    let research_items = find_by_parents::<research_items::Entity, _>(
        conn,
        research_items::Column::ProjectId,
        &project_ids,
    )
    .await?;

    let media = media_assets::Entity::find()
        .filter(media_assets::Column::ProjectId.eq(project.id))
        .order_by_asc(media_assets::Column::CreatedAt)
        .all(conn)
        .await?;

    let mut graph = ProjectGraph {
        project,
        documents,
        document_versions,
        document_comments,
        characters,
        character_stats,
        world_settings,
        relationships,
        plots,
        plot_points,
        writing_goals,
        research_items,
        translations,
        audio_assets,
        storyboards,
        reader_predictions,
        media,
    };

    let owned: HashSet<Uuid> = graph.media.iter().map(|m| m.id).collect();
    let extra: Vec<Uuid> = graph
        .referenced_media_ids()
        .into_iter()
        .filter(|id| !owned.contains(id))
        .collect();
    if !extra.is_empty() {
        let mut referenced = load_media_by_ids(conn, &extra).await?;
        debug!(
            project_id = %graph.project.id,
            "including {} media assets referenced from content",
            referenced.len()
        );
        graph.media.append(&mut referenced);
    }

    Ok(graph)
}

pub async fn load_media_by_ids<C>(conn: &C, ids: &[Uuid]) -> Result<Vec<media_assets::Model>, DbErr>
where
    C: ConnectionTrait,
{
    find_by_parents::<media_assets::Entity, _>(conn, media_assets::Column::Id, ids).await
}
