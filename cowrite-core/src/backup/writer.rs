use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, TransactionTrait,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::remap::RemappedGraph;
use crate::database::entities::{
    audio_assets, character_stats, characters, document_comments, document_versions, documents,
    media_assets, plot_points, plots, projects, reader_predictions, relationships,
    research_items, storyboards, translations, world_settings, writing_goals,
};
use crate::services::search_indexer::{
    index_best_effort, CHARACTERS_INDEX, DOCUMENTS_INDEX, PLOTS_INDEX, PROJECTS_INDEX,
    WORLD_SETTINGS_INDEX,
};
use crate::services::{BlobStorage, SearchIndexer};

const INSERT_BATCH_SIZE: usize = 500;

/// Insert ActiveModels in manageable batches.
async fn insert_batches<A, C>(conn: &C, mut models: Vec<A>) -> Result<(), sea_orm::DbErr>
where
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    while !models.is_empty() {
        let batch_size = INSERT_BATCH_SIZE.min(models.len());
        let batch: Vec<A> = models.drain(..batch_size).collect();
        <A::Entity as EntityTrait>::insert_many(batch)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}

fn active<M, A>(models: Vec<M>) -> Vec<A>
where
    A: From<M>,
{
    models.into_iter().map(A::from).collect()
}

/// Rows that form a tree through a nullable self reference.
trait TreeRow {
    fn row_id(&self) -> Uuid;
    fn parent(&self) -> Option<Uuid>;
    fn detach(&mut self);
}

impl TreeRow for documents::Model {
    fn row_id(&self) -> Uuid {
        self.id
    }
    fn parent(&self) -> Option<Uuid> {
        self.parent_id
    }
    fn detach(&mut self) {
        self.parent_id = None;
    }
}

impl TreeRow for world_settings::Model {
    fn row_id(&self) -> Uuid {
        self.id
    }
    fn parent(&self) -> Option<Uuid> {
        self.parent_id
    }
    fn detach(&mut self) {
        self.parent_id = None;
    }
}

fn in_cycle(parents: &HashMap<Uuid, Uuid>, start: Uuid) -> bool {
    let mut current = parents.get(&start).copied();
    for _ in 0..parents.len() {
        match current {
            Some(id) if id == start => return true,
            Some(id) => current = parents.get(&id).copied(),
            None => return false,
        }
    }
    false
}

/// Orders rows so every parent precedes its children. Parents outside the
/// set are cleared, and every member of a parent cycle is detached.
fn order_parents_first<T: TreeRow>(rows: Vec<T>) -> Vec<T> {
    let known: HashSet<Uuid> = rows.iter().map(TreeRow::row_id).collect();
    let mut placed = HashSet::with_capacity(rows.len());
    let mut ordered = Vec::with_capacity(rows.len());
    let mut remaining = rows;

    while !remaining.is_empty() {
        let before = remaining.len();
        let mut deferred = Vec::new();
        for mut row in remaining {
            match row.parent() {
                Some(parent) if !known.contains(&parent) => row.detach(),
                Some(parent) if !placed.contains(&parent) => {
                    deferred.push(row);
                    continue;
                }
                _ => {}
            }
            placed.insert(row.row_id());
            ordered.push(row);
        }

        if deferred.len() == before {
            // Every stuck row hangs off a cycle; cut each cycle at all its members
            let parents: HashMap<Uuid, Uuid> = deferred
                .iter()
                .filter_map(|row| row.parent().map(|parent| (row.row_id(), parent)))
                .collect();
            for row in deferred.iter_mut() {
                if in_cycle(&parents, row.row_id()) {
                    row.detach();
                }
            }
        }
        remaining = deferred;
    }

    ordered
}

struct IndexEntry {
    index: &'static str,
    id: String,
    body: Value,
}

fn index_entries(graph: &RemappedGraph) -> Vec<IndexEntry> {
    let project = &graph.project;
    let project_id = project.id.to_string();
    let mut entries = vec![IndexEntry {
        index: PROJECTS_INDEX,
        id: project_id.clone(),
        body: json!({
            "id": project_id,
            "title": project.title,
            "description": project.description,
            "genre": project.genre,
            "ownerId": project.owner_id.to_string(),
        }),
    }];

    entries.extend(graph.documents.iter().map(|d| IndexEntry {
        index: DOCUMENTS_INDEX,
        id: d.id.to_string(),
        body: json!({
            "id": d.id.to_string(),
            "projectId": project_id,
            "title": d.title,
            "content": d.content.clone().unwrap_or_default(),
        }),
    }));
    entries.extend(graph.characters.iter().map(|c| IndexEntry {
        index: CHARACTERS_INDEX,
        id: c.id.to_string(),
        body: json!({
            "id": c.id.to_string(),
            "projectId": project_id,
            "name": c.name,
            "role": c.role,
        }),
    }));
    entries.extend(graph.world_settings.iter().map(|w| IndexEntry {
        index: WORLD_SETTINGS_INDEX,
        id: w.id.to_string(),
        body: json!({
            "id": w.id.to_string(),
            "projectId": project_id,
            "title": w.title,
            "content": w.content.clone().unwrap_or_default(),
            "category": w.category,
        }),
    }));
    entries.extend(graph.plots.iter().map(|p| IndexEntry {
        index: PLOTS_INDEX,
        id: p.id.to_string(),
        body: json!({
            "id": p.id.to_string(),
            "projectId": project_id,
            "title": p.title,
            "description": p.description.clone().unwrap_or_default(),
        }),
    }));

    entries
}

/// Persists a remapped graph in one transaction, with media payloads written
/// to blob storage ahead of their rows.
pub struct GraphWriter<'a> {
    db: &'a DatabaseConnection,
    blobs: &'a dyn BlobStorage,
    indexer: &'a dyn SearchIndexer,
}

impl<'a> GraphWriter<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        blobs: &'a dyn BlobStorage,
        indexer: &'a dyn SearchIndexer,
    ) -> Self {
        Self { db, blobs, indexer }
    }

    /// Writes everything or nothing. On failure the transaction is rolled
    /// back and every payload written by this call is deleted again.
    pub async fn write(&self, graph: RemappedGraph) -> Result<Uuid> {
        let project_id = graph.project.id;
        let index_queue = index_entries(&graph);
        let mut written: Vec<String> = Vec::new();

        let txn = self
            .db
            .begin()
            .await
            .context("failed to open import transaction")?;

        if let Err(err) = self.write_rows(&txn, graph, &mut written).await {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("import rollback failed: {}", rollback_err);
            }
            self.remove_written(&written).await;
            return Err(err);
        }

        if let Err(err) = txn.commit().await {
            self.remove_written(&written).await;
            return Err(err).context("failed to commit import transaction");
        }

        info!(%project_id, files = written.len(), "import committed");

        for entry in index_queue {
            index_best_effort(self.indexer, entry.index, &entry.id, entry.body).await;
        }

        Ok(project_id)
    }

    async fn write_rows(
        &self,
        txn: &DatabaseTransaction,
        graph: RemappedGraph,
        written: &mut Vec<String>,
    ) -> Result<()> {
        projects::ActiveModel::from(graph.project)
            .insert(txn)
            .await
            .context("failed to insert project")?;

        let documents = order_parents_first(graph.documents);
        insert_batches::<documents::ActiveModel, _>(txn, active(documents))
            .await
            .context("failed to insert documents")?;
        insert_batches::<document_versions::ActiveModel, _>(txn, active(graph.document_versions))
            .await
            .context("failed to insert document versions")?;
        insert_batches::<document_comments::ActiveModel, _>(txn, active(graph.document_comments))
            .await
            .context("failed to insert document comments")?;

        insert_batches::<characters::ActiveModel, _>(txn, active(graph.characters))
            .await
            .context("failed to insert characters")?;
        insert_batches::<character_stats::ActiveModel, _>(txn, active(graph.character_stats))
            .await
            .context("failed to insert character stats")?;

        let world_settings = order_parents_first(graph.world_settings);
        insert_batches::<world_settings::ActiveModel, _>(txn, active(world_settings))
            .await
            .context("failed to insert world settings")?;
        insert_batches::<relationships::ActiveModel, _>(txn, active(graph.relationships))
            .await
            .context("failed to insert relationships")?;

        insert_batches::<plots::ActiveModel, _>(txn, active(graph.plots))
            .await
            .context("failed to insert plots")?;
        insert_batches::<plot_points::ActiveModel, _>(txn, active(graph.plot_points))
            .await
            .context("failed to insert plot points")?;

        insert_batches::<writing_goals::ActiveModel, _>(txn, active(graph.writing_goals))
            .await
            .context("failed to insert writing goals")?;
        insert_batches::<research_items::ActiveModel, _>(txn, active(graph.research_items))
            .await
            .context("failed to insert research items")?;
        insert_batches::<translations::ActiveModel, _>(txn, active(graph.translations))
            .await
            .context("failed to insert translations")?;
        insert_batches::<audio_assets::ActiveModel, _>(txn, active(graph.audio_assets))
            .await
            .context("failed to insert audio assets")?;
        insert_batches::<storyboards::ActiveModel, _>(txn, active(graph.storyboards))
            .await
            .context("failed to insert storyboards")?;
        insert_batches::<reader_predictions::ActiveModel, _>(txn, active(graph.reader_predictions))
            .await
            .context("failed to insert reader predictions")?;

        for upload in graph.media {
            let path = self
                .blobs
                .write_file(&upload.file_name, &upload.bytes)
                .await
                .with_context(|| format!("failed to store media {}", upload.file_name))?;
            written.push(path.clone());

            let mut model = upload.model;
            model.storage_path = path;
            media_assets::ActiveModel::from(model)
                .insert(txn)
                .await
                .with_context(|| format!("failed to insert media {}", upload.file_name))?;
        }

        Ok(())
    }

    async fn remove_written(&self, written: &[String]) {
        for path in written {
            if let Err(err) = self.blobs.delete_file(path).await {
                warn!(path = %path, "failed to remove media written by failed import: {:#}", err);
            }
        }
    }
}
