//! Fresh identities for an imported bundle.
//!
//! The table of `(kind, old id) -> new id` is filled for the whole bundle
//! before any record is rewritten, so references resolve regardless of the
//! order records appear in.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::codec::{extension_for_mime, is_plain_extension, DecodedBundle};
use super::scanner::{deep_replace_strings, MediaIdRewriter};
use crate::database::entities::{
    audio_assets, character_stats, characters, document_comments, document_versions, documents,
    media_assets, plot_points, plots, projects, reader_predictions, relationships,
    research_items, storyboards, translations, world_settings, writing_goals,
};

pub const IMPORTED_TITLE_SUFFIX: &str = " (imported)";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Document,
    DocumentVersion,
    DocumentComment,
    Character,
    CharacterStat,
    WorldSetting,
    Relationship,
    Plot,
    PlotPoint,
    WritingGoal,
    ResearchItem,
    Translation,
    AudioAsset,
    Storyboard,
    ReaderPrediction,
    MediaAsset,
}

#[derive(Debug, Clone)]
pub struct RemapTable {
    project_id: Uuid,
    source_project_id: String,
    ids: HashMap<(EntityKind, String), Uuid>,
    /// Old media id -> archive entry its payload is taken from.
    media_sources: HashMap<String, String>,
    media_rewriter: MediaIdRewriter,
}

impl RemapTable {
    /// Assigns one fresh id per record in `decoded`. Media assets only get
    /// an entry when their payload is present.
    pub fn build(decoded: &DecodedBundle) -> Self {
        let bundle = &decoded.bundle;
        let mut table = Self {
            project_id: Uuid::new_v4(),
            source_project_id: bundle.project.id.clone(),
            ids: HashMap::new(),
            media_sources: HashMap::new(),
            media_rewriter: MediaIdRewriter::default(),
        };

        let groups: [(EntityKind, Vec<&str>); 15] = [
            (EntityKind::Document, bundle.documents.iter().map(|r| r.id.as_str()).collect()),
            (
                EntityKind::DocumentVersion,
                bundle.document_versions.iter().map(|r| r.id.as_str()).collect(),
            ),
            (
                EntityKind::DocumentComment,
                bundle.document_comments.iter().map(|r| r.id.as_str()).collect(),
            ),
            (EntityKind::Character, bundle.characters.iter().map(|r| r.id.as_str()).collect()),
            (
                EntityKind::CharacterStat,
                bundle.character_stats.iter().map(|r| r.id.as_str()).collect(),
            ),
            (
                EntityKind::WorldSetting,
                bundle.world_settings.iter().map(|r| r.id.as_str()).collect(),
            ),
            (
                EntityKind::Relationship,
                bundle.relationships.iter().map(|r| r.id.as_str()).collect(),
            ),
            (EntityKind::Plot, bundle.plots.iter().map(|r| r.id.as_str()).collect()),
            (EntityKind::PlotPoint, bundle.plot_points.iter().map(|r| r.id.as_str()).collect()),
            (
                EntityKind::WritingGoal,
                bundle.writing_goals.iter().map(|r| r.id.as_str()).collect(),
            ),
            (
                EntityKind::ResearchItem,
                bundle.research_items.iter().map(|r| r.id.as_str()).collect(),
            ),
            (
                EntityKind::Translation,
                bundle.translations.iter().map(|r| r.id.as_str()).collect(),
            ),
            (EntityKind::AudioAsset, bundle.audio_assets.iter().map(|r| r.id.as_str()).collect()),
            (EntityKind::Storyboard, bundle.storyboards.iter().map(|r| r.id.as_str()).collect()),
            (
                EntityKind::ReaderPrediction,
                bundle.reader_predictions.iter().map(|r| r.id.as_str()).collect(),
            ),
        ];
        for (kind, old_ids) in groups {
            for old in old_ids {
                table.assign(kind, old);
            }
        }

        // Each archive entry backs at most one asset, and empty entries none
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut replacements = Vec::new();
        for record in &bundle.media_assets {
            let Some(path) = record.zip_path.as_deref() else {
                continue;
            };
            let has_payload = decoded.payload_for(record).is_some_and(|bytes| !bytes.is_empty());
            if record.id.is_empty() || !has_payload || claimed.contains(path) {
                continue;
            }
            if let Some(new_id) = table.assign(EntityKind::MediaAsset, &record.id) {
                claimed.insert(path);
                table.media_sources.insert(record.id.clone(), path.to_string());
                replacements.push((record.id.clone(), new_id.to_string()));
            }
        }
        table.media_rewriter = MediaIdRewriter::new(&replacements);

        table
    }

    /// Returns the new id when `old` was not seen before for `kind`.
    fn assign(&mut self, kind: EntityKind, old: &str) -> Option<Uuid> {
        let key = (kind, old.to_string());
        if self.ids.contains_key(&key) {
            return None;
        }
        let new_id = Uuid::new_v4();
        self.ids.insert(key, new_id);
        Some(new_id)
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn get(&self, kind: EntityKind, old: &str) -> Option<Uuid> {
        self.ids.get(&(kind, old.to_string())).copied()
    }

    pub fn resolve_opt(&self, kind: EntityKind, old: Option<&str>) -> Option<Uuid> {
        old.and_then(|old| self.get(kind, old))
    }

    /// Archive entry the asset `old` is materialized from, if it has one.
    pub fn media_source(&self, old: &str) -> Option<&str> {
        self.media_sources.get(old).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn rewrite_text(&self, text: &str) -> String {
        self.media_rewriter.rewrite(text)
    }

    pub fn rewrite_opt(&self, text: Option<&str>) -> Option<String> {
        text.map(|text| self.rewrite_text(text))
    }

    pub fn rewrite_json(&self, value: &Value) -> Value {
        deep_replace_strings(value, &|s: &str| self.rewrite_text(s))
    }

    /// Like `rewrite_json`, but a missing value becomes an empty object.
    fn rewrite_json_object(&self, value: &Value) -> Value {
        if value.is_null() {
            json!({})
        } else {
            self.rewrite_json(value)
        }
    }
}

/// A media payload to materialize alongside its row.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub model: media_assets::Model,
    /// `{newId}{ext}`
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Records rewritten under fresh ids, ready to insert.
#[derive(Debug, Clone)]
pub struct RemappedGraph {
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
    pub media: Vec<MediaUpload>,
    /// Records left out because a required reference did not resolve or
    /// their id repeated an earlier record.
    pub dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCounts {
    pub documents: usize,
    pub document_versions: usize,
    pub document_comments: usize,
    pub characters: usize,
    pub character_stats: usize,
    pub world_settings: usize,
    pub relationships: usize,
    pub plots: usize,
    pub plot_points: usize,
    pub writing_goals: usize,
    pub research_items: usize,
    pub translations: usize,
    pub audio_assets: usize,
    pub storyboards: usize,
    pub reader_predictions: usize,
    pub media_assets: usize,
    pub dropped: usize,
}

impl RemappedGraph {
    pub fn counts(&self) -> ImportCounts {
        ImportCounts {
            documents: self.documents.len(),
            document_versions: self.document_versions.len(),
            document_comments: self.document_comments.len(),
            characters: self.characters.len(),
            character_stats: self.character_stats.len(),
            world_settings: self.world_settings.len(),
            relationships: self.relationships.len(),
            plots: self.plots.len(),
            plot_points: self.plot_points.len(),
            writing_goals: self.writing_goals.len(),
            research_items: self.research_items.len(),
            translations: self.translations.len(),
            audio_assets: self.audio_assets.len(),
            storyboards: self.storyboards.len(),
            reader_predictions: self.reader_predictions.len(),
            media_assets: self.media.len(),
            dropped: self.dropped,
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn parse_due_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Rewrites a decoded bundle for insertion on behalf of `owner_id`.
pub struct IdentityRemapper {
    owner_id: Uuid,
    now: DateTime<Utc>,
    seen: HashSet<(EntityKind, String)>,
    dropped: usize,
}

impl IdentityRemapper {
    pub fn new(owner_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            now,
            seen: HashSet::new(),
            dropped: 0,
        }
    }

    /// First occurrence of each `(kind, id)` wins; later ones are dropped.
    fn first_seen(&mut self, kind: EntityKind, old: &str) -> bool {
        if self.seen.insert((kind, old.to_string())) {
            true
        } else {
            debug!(?kind, old_id = old, "dropping duplicate record");
            self.dropped += 1;
            false
        }
    }

    fn drop_unresolved(&mut self, kind: EntityKind, old: &str, reference: &str) {
        debug!(?kind, old_id = old, reference, "dropping record with unresolved reference");
        self.dropped += 1;
    }

    pub fn remap(mut self, decoded: DecodedBundle, table: &RemapTable) -> RemappedGraph {
        let DecodedBundle {
            bundle,
            mut payloads,
        } = decoded;
        let now = self.now;
        let owner_id = self.owner_id;
        let project_id = table.project_id();

        let source = &bundle.project;
        let base_title = source.title.trim();
        let project = projects::Model {
            id: project_id,
            owner_id,
            title: format!(
                "{}{}",
                if base_title.is_empty() { "Untitled" } else { base_title },
                IMPORTED_TITLE_SUFFIX
            ),
            description: table.rewrite_opt(source.description.as_deref()),
            genre: source.genre.clone(),
            cover_url: table.rewrite_opt(source.cover_url.as_deref()),
            settings: table.rewrite_json_object(&source.settings),
            word_count: source.word_count,
            is_public: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let mut documents = Vec::new();
        for record in &bundle.documents {
            if !self.first_seen(EntityKind::Document, &record.id) {
                continue;
            }
            let Some(id) = table.get(EntityKind::Document, &record.id) else {
                continue;
            };
            documents.push(documents::Model {
                id,
                project_id,
                parent_id: table.resolve_opt(EntityKind::Document, record.parent_id.as_deref()),
                kind: non_empty_or(&record.kind, "chapter"),
                title: table.rewrite_text(&record.title),
                content: table.rewrite_opt(record.content.as_deref()),
                order_index: record.order_index,
                word_count: record.word_count,
                status: non_empty_or(&record.status, "draft"),
                notes: table.rewrite_opt(record.notes.as_deref()),
                created_at: now,
                updated_at: now,
            });
        }

        let mut document_versions = Vec::new();
        for record in &bundle.document_versions {
            if !self.first_seen(EntityKind::DocumentVersion, &record.id) {
                continue;
            }
            let Some(document_id) = table.get(EntityKind::Document, &record.document_id) else {
                self.drop_unresolved(EntityKind::DocumentVersion, &record.id, "documentId");
                continue;
            };
            let Some(id) = table.get(EntityKind::DocumentVersion, &record.id) else {
                continue;
            };
            document_versions.push(document_versions::Model {
                id,
                document_id,
                content: table.rewrite_text(&record.content),
                word_count: record.word_count,
                version_name: record.version_name.clone(),
                created_by: Some(owner_id),
                created_at: record.created_at.unwrap_or(now),
            });
        }

        let mut document_comments = Vec::new();
        for record in &bundle.document_comments {
            if !self.first_seen(EntityKind::DocumentComment, &record.id) {
                continue;
            }
            let Some(document_id) = table.get(EntityKind::Document, &record.document_id) else {
                self.drop_unresolved(EntityKind::DocumentComment, &record.id, "documentId");
                continue;
            };
            let Some(id) = table.get(EntityKind::DocumentComment, &record.id) else {
                continue;
            };
            document_comments.push(document_comments::Model {
                id,
                document_id,
                user_id: Some(owner_id),
                content: table.rewrite_text(&record.content),
                position: record.position.as_ref().map(|v| table.rewrite_json(v)),
                created_at: record.created_at.unwrap_or(now),
            });
        }

        let mut characters = Vec::new();
        for record in &bundle.characters {
            if !self.first_seen(EntityKind::Character, &record.id) {
                continue;
            }
            let Some(id) = table.get(EntityKind::Character, &record.id) else {
                continue;
            };
            characters.push(characters::Model {
                id,
                project_id,
                name: table.rewrite_text(&record.name),
                role: record.role.clone(),
                profile: table.rewrite_json_object(&record.profile),
                appearance: table.rewrite_json_object(&record.appearance),
                personality: table.rewrite_json_object(&record.personality),
                backstory: table.rewrite_opt(record.backstory.as_deref()),
                speech_sample: table.rewrite_opt(record.speech_sample.as_deref()),
                image_url: table.rewrite_opt(record.image_url.as_deref()),
                created_at: now,
                updated_at: now,
            });
        }

        let mut character_stats = Vec::new();
        for record in &bundle.character_stats {
            if !self.first_seen(EntityKind::CharacterStat, &record.id) {
                continue;
            }
            let Some(character_id) = table.get(EntityKind::Character, &record.character_id)
            else {
                self.drop_unresolved(EntityKind::CharacterStat, &record.id, "characterId");
                continue;
            };
            let Some(id) = table.get(EntityKind::CharacterStat, &record.id) else {
                continue;
            };
            character_stats.push(character_stats::Model {
                id,
                character_id,
                template_type: non_empty_or(&record.template_type, "custom"),
                stats: table.rewrite_json_object(&record.stats),
                episode_num: record.episode_num,
                created_at: now,
            });
        }

        let mut world_settings = Vec::new();
        for record in &bundle.world_settings {
            if !self.first_seen(EntityKind::WorldSetting, &record.id) {
                continue;
            }
            let Some(id) = table.get(EntityKind::WorldSetting, &record.id) else {
                continue;
            };
            world_settings.push(world_settings::Model {
                id,
                project_id,
                parent_id: table
                    .resolve_opt(EntityKind::WorldSetting, record.parent_id.as_deref()),
                category: record.category.clone(),
                title: table.rewrite_text(&record.title),
                content: table.rewrite_opt(record.content.as_deref()),
                metadata: table.rewrite_json_object(&record.metadata),
                created_at: now,
            });
        }

        let mut relationships = Vec::new();
        for record in &bundle.relationships {
            if !self.first_seen(EntityKind::Relationship, &record.id) {
                continue;
            }
            let character_a = table.get(EntityKind::Character, &record.character_a_id);
            let character_b = table.get(EntityKind::Character, &record.character_b_id);
            let (Some(character_a_id), Some(character_b_id)) = (character_a, character_b) else {
                self.drop_unresolved(EntityKind::Relationship, &record.id, "characterId");
                continue;
            };
            let Some(id) = table.get(EntityKind::Relationship, &record.id) else {
                continue;
            };
            relationships.push(relationships::Model {
                id,
                project_id,
                character_a_id,
                character_b_id,
                relation_type: record.relation_type.clone(),
                description: table.rewrite_opt(record.description.as_deref()),
                is_bidirectional: record.is_bidirectional,
                metadata: table.rewrite_json_object(&record.metadata),
                created_at: now,
            });
        }

        let mut plots = Vec::new();
        for record in &bundle.plots {
            if !self.first_seen(EntityKind::Plot, &record.id) {
                continue;
            }
            let Some(id) = table.get(EntityKind::Plot, &record.id) else {
                continue;
            };
            plots.push(plots::Model {
                id,
                project_id,
                title: table.rewrite_text(&record.title),
                description: table.rewrite_opt(record.description.as_deref()),
                order_index: record.order_index,
                metadata: table.rewrite_json_object(&record.metadata),
                created_at: now,
                updated_at: now,
            });
        }

        let mut plot_points = Vec::new();
        for record in &bundle.plot_points {
            if !self.first_seen(EntityKind::PlotPoint, &record.id) {
                continue;
            }
            let Some(plot_id) = table.get(EntityKind::Plot, &record.plot_id) else {
                self.drop_unresolved(EntityKind::PlotPoint, &record.id, "plotId");
                continue;
            };
            let Some(id) = table.get(EntityKind::PlotPoint, &record.id) else {
                continue;
            };
            plot_points.push(plot_points::Model {
                id,
                plot_id,
                document_id: table.resolve_opt(EntityKind::Document, record.document_id.as_deref()),
                title: table.rewrite_text(&record.title),
                description: table.rewrite_opt(record.description.as_deref()),
                order_index: record.order_index,
                metadata: table.rewrite_json_object(&record.metadata),
                created_at: now,
            });
        }

        let mut writing_goals = Vec::new();
        for record in &bundle.writing_goals {
            if !self.first_seen(EntityKind::WritingGoal, &record.id) {
                continue;
            }
            let Some(id) = table.get(EntityKind::WritingGoal, &record.id) else {
                continue;
            };
            writing_goals.push(writing_goals::Model {
                id,
                project_id,
                user_id: Some(owner_id),
                goal_type: non_empty_or(&record.goal_type, "total"),
                target_words: record.target_words,
                current_words: record.current_words,
                due_date: parse_due_date(record.due_date.as_deref()),
                created_at: now,
                updated_at: now,
            });
        }

        let mut research_items = Vec::new();
        for record in &bundle.research_items {
            if !self.first_seen(EntityKind::ResearchItem, &record.id) {
                continue;
            }
            let Some(id) = table.get(EntityKind::ResearchItem, &record.id) else {
                continue;
            };
            research_items.push(research_items::Model {
                id,
                project_id,
                query: table.rewrite_text(&record.query),
                result: record.result.as_ref().map(|v| table.rewrite_json(v)),
                created_at: now,
            });
        }

        let mut translations = Vec::new();
        for record in &bundle.translations {
            if !self.first_seen(EntityKind::Translation, &record.id) {
                continue;
            }
            let Some(document_id) = table.get(EntityKind::Document, &record.document_id) else {
                self.drop_unresolved(EntityKind::Translation, &record.id, "documentId");
                continue;
            };
            let Some(id) = table.get(EntityKind::Translation, &record.id) else {
                continue;
            };
            translations.push(translations::Model {
                id,
                document_id,
                target_language: record.target_language.clone(),
                provider: record.provider.clone(),
                content: table.rewrite_opt(record.content.as_deref()),
                created_at: now,
            });
        }

        let mut audio_assets = Vec::new();
        for record in &bundle.audio_assets {
            if !self.first_seen(EntityKind::AudioAsset, &record.id) {
                continue;
            }
            let Some(document_id) = table.get(EntityKind::Document, &record.document_id) else {
                self.drop_unresolved(EntityKind::AudioAsset, &record.id, "documentId");
                continue;
            };
            let Some(id) = table.get(EntityKind::AudioAsset, &record.id) else {
                continue;
            };
            audio_assets.push(audio_assets::Model {
                id,
                document_id,
                voice: record.voice.clone(),
                provider: record.provider.clone(),
                script: table.rewrite_opt(record.script.as_deref()),
                audio_url: record.audio_url.clone(),
                created_at: now,
            });
        }

        let mut storyboards = Vec::new();
        for record in &bundle.storyboards {
            if !self.first_seen(EntityKind::Storyboard, &record.id) {
                continue;
            }
            let Some(document_id) = table.get(EntityKind::Document, &record.document_id) else {
                self.drop_unresolved(EntityKind::Storyboard, &record.id, "documentId");
                continue;
            };
            let Some(id) = table.get(EntityKind::Storyboard, &record.id) else {
                continue;
            };
            storyboards.push(storyboards::Model {
                id,
                document_id,
                provider: record.provider.clone(),
                content: record.content.as_ref().map(|v| table.rewrite_json(v)),
                created_at: now,
            });
        }

        let mut reader_predictions = Vec::new();
        for record in &bundle.reader_predictions {
            if !self.first_seen(EntityKind::ReaderPrediction, &record.id) {
                continue;
            }
            let Some(document_id) = table.get(EntityKind::Document, &record.document_id) else {
                self.drop_unresolved(EntityKind::ReaderPrediction, &record.id, "documentId");
                continue;
            };
            let Some(id) = table.get(EntityKind::ReaderPrediction, &record.id) else {
                continue;
            };
            reader_predictions.push(reader_predictions::Model {
                id,
                document_id,
                provider: record.provider.clone(),
                result: record.result.as_ref().map(|v| table.rewrite_json(v)),
                created_at: now,
            });
        }

        let mut media = Vec::new();
        for record in &bundle.media_assets {
            // No table entry means no payload: the asset is skipped, not an error
            let Some(id) = table.get(EntityKind::MediaAsset, &record.id) else {
                debug!(old_id = %record.id, "media payload absent, skipping asset");
                continue;
            };
            let Some(source) = table.media_source(&record.id) else {
                continue;
            };
            if record.zip_path.as_deref() != Some(source) {
                self.drop_unresolved(EntityKind::MediaAsset, &record.id, "zipPath");
                continue;
            }
            if !self.first_seen(EntityKind::MediaAsset, &record.id) {
                continue;
            }
            let Some(bytes) = payloads.remove(source) else {
                continue;
            };

            let ext = record
                .ext
                .as_deref()
                .filter(|ext| is_plain_extension(ext))
                .map(|ext| format!(".{}", ext.trim_start_matches('.')))
                .or_else(|| extension_for_mime(&record.mime_type).map(str::to_string))
                .unwrap_or_default();
            let file_name = format!("{}{}", id, ext);
            let in_project = record
                .project_id
                .as_deref()
                .is_some_and(|old| !old.is_empty() && old == table.source_project_id);

            media.push(MediaUpload {
                model: media_assets::Model {
                    id,
                    user_id: owner_id,
                    project_id: in_project.then_some(project_id),
                    original_name: record.original_name.clone(),
                    mime_type: non_empty_or(&record.mime_type, "application/octet-stream"),
                    size: bytes.len() as i64,
                    storage_path: file_name.clone(),
                    url: format!("/api/media/{}", id),
                    created_at: now,
                },
                file_name,
                bytes,
            });
        }

        RemappedGraph {
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
            dropped: self.dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::bundle::BackupBundle;
    use std::collections::HashMap;

    const OLD_MEDIA: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
    const MISSING_MEDIA: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    fn decoded(value: Value, payloads: Vec<(String, Vec<u8>)>) -> DecodedBundle {
        let bundle: BackupBundle = serde_json::from_value(value).unwrap();
        DecodedBundle {
            bundle,
            payloads: payloads.into_iter().collect::<HashMap<_, _>>(),
        }
    }

    fn remap(decoded: DecodedBundle, owner: Uuid) -> (RemapTable, RemappedGraph) {
        let table = RemapTable::build(&decoded);
        let graph = IdentityRemapper::new(owner, Utc::now()).remap(decoded, &table);
        (table, graph)
    }

    #[test]
    fn resolves_forward_references() {
        let input = decoded(
            json!({
                "version": 1,
                "project": { "id": "p", "title": "Saga", "ownerId": "someone-else", "isPublic": true },
                "plotPoints": [{ "id": "pp1", "plotId": "plot1", "documentId": "d2", "title": "Twist" }],
                "documents": [
                    { "id": "d1", "parentId": "d2", "title": "Scene" },
                    { "id": "d2", "title": "Chapter" }
                ],
                "plots": [{ "id": "plot1", "title": "Main" }]
            }),
            vec![],
        );
        let owner = Uuid::new_v4();
        let (table, graph) = remap(input, owner);

        let d2 = table.get(EntityKind::Document, "d2").unwrap();
        assert_eq!(graph.documents[0].parent_id, Some(d2));
        assert_eq!(graph.documents[1].id, d2);
        assert_eq!(graph.plot_points[0].document_id, Some(d2));
        assert_eq!(graph.plot_points[0].plot_id, graph.plots[0].id);

        assert_eq!(graph.project.owner_id, owner);
        assert_eq!(graph.project.title, "Saga (imported)");
        assert!(!graph.project.is_public);
        assert_eq!(graph.project.settings, json!({}));
        assert_ne!(graph.documents[0].id.to_string(), "d1");
    }

    #[test]
    fn unresolved_references_are_nulled_or_dropped() {
        let input = decoded(
            json!({
                "version": 1,
                "project": { "id": "p", "title": "T" },
                "documents": [{ "id": "d1", "parentId": "elsewhere", "title": "A" }],
                "documentVersions": [
                    { "id": "v1", "documentId": "d1", "content": "kept" },
                    { "id": "v2", "documentId": "gone", "content": "orphan" }
                ],
                "plotPoints": [{ "id": "pp1", "plotId": "no-plot", "title": "x" }],
                "characters": [{ "id": "c1", "name": "Ann" }],
                "relationships": [{ "id": "r1", "characterAId": "c1", "characterBId": "c9" }]
            }),
            vec![],
        );
        let (_, graph) = remap(input, Uuid::new_v4());

        assert_eq!(graph.documents[0].parent_id, None);
        assert_eq!(graph.document_versions.len(), 1);
        assert_eq!(graph.document_versions[0].document_id, graph.documents[0].id);
        assert!(graph.plot_points.is_empty());
        assert!(graph.relationships.is_empty());
        assert_eq!(graph.counts().dropped, 3);
    }

    #[test]
    fn media_references_follow_materialized_payloads_only() {
        let input = decoded(
            json!({
                "version": 1,
                "project": {
                    "id": "p",
                    "title": "T",
                    "coverUrl": format!("/api/media/{OLD_MEDIA}"),
                    "settings": { "theme": { "bg": format!("/api/media/{OLD_MEDIA}") }, "n": 1 }
                },
                "characters": [{
                    "id": "c1",
                    "name": "Ann",
                    "imageUrl": format!("/api/media/{OLD_MEDIA}"),
                    "backstory": format!("see /api/media/{MISSING_MEDIA}")
                }],
                "mediaAssets": [
                    { "id": OLD_MEDIA, "projectId": "p", "mimeType": "image/png", "size": 99,
                      "url": format!("/api/media/{OLD_MEDIA}"), "zipPath": format!("media/{OLD_MEDIA}.png"), "ext": ".png" },
                    { "id": MISSING_MEDIA, "projectId": "p", "mimeType": "image/png",
                      "url": format!("/api/media/{MISSING_MEDIA}"), "zipPath": format!("media/{MISSING_MEDIA}.png"), "ext": ".png" }
                ]
            }),
            vec![(format!("media/{OLD_MEDIA}.png"), b"0123456789".to_vec())],
        );
        let (table, graph) = remap(input, Uuid::new_v4());

        let new_media = table.get(EntityKind::MediaAsset, OLD_MEDIA).unwrap();
        assert!(table.get(EntityKind::MediaAsset, MISSING_MEDIA).is_none());

        assert_eq!(graph.media.len(), 1);
        let upload = &graph.media[0];
        assert_eq!(upload.model.id, new_media);
        assert_eq!(upload.model.size, 10);
        assert_eq!(upload.model.project_id, Some(graph.project.id));
        assert_eq!(upload.model.url, format!("/api/media/{new_media}"));
        assert_eq!(upload.file_name, format!("{new_media}.png"));

        let character = &graph.characters[0];
        assert_eq!(character.image_url, Some(format!("/api/media/{new_media}")));
        assert_eq!(
            character.backstory,
            Some(format!("see /api/media/{MISSING_MEDIA}"))
        );
        assert_eq!(graph.project.cover_url, Some(format!("/api/media/{new_media}")));
        assert_eq!(
            graph.project.settings,
            json!({ "theme": { "bg": format!("/api/media/{new_media}") }, "n": 1 })
        );
    }

    #[test]
    fn duplicate_ids_keep_the_first_record() {
        let input = decoded(
            json!({
                "version": 1,
                "project": { "id": "p", "title": "T" },
                "documents": [
                    { "id": "d1", "title": "first" },
                    { "id": "d1", "title": "second" }
                ],
                "writingGoals": [{ "id": "g1", "goalType": "daily", "targetWords": 500, "dueDate": "2026-03-01T00:00:00.000Z" }]
            }),
            vec![],
        );
        let owner = Uuid::new_v4();
        let (_, graph) = remap(input, owner);

        assert_eq!(graph.documents.len(), 1);
        assert_eq!(graph.documents[0].title, "first");
        assert_eq!(graph.counts().dropped, 1);
        assert_eq!(graph.writing_goals[0].user_id, Some(owner));
        assert_eq!(
            graph.writing_goals[0].due_date,
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
    }

    #[test]
    fn shared_archive_entry_backs_only_one_asset() {
        let input = decoded(
            json!({
                "version": 1,
                "project": { "id": "p", "title": "T" },
                "characters": [{
                    "id": "c1",
                    "name": "Ann",
                    "backstory": format!("/api/media/{OLD_MEDIA} /api/media/{MISSING_MEDIA}")
                }],
                "mediaAssets": [
                    { "id": OLD_MEDIA, "mimeType": "image/png", "zipPath": "media/shared.png" },
                    { "id": MISSING_MEDIA, "mimeType": "image/png", "zipPath": "media/shared.png" }
                ]
            }),
            vec![("media/shared.png".to_string(), b"0123456789".to_vec())],
        );
        let (table, graph) = remap(input, Uuid::new_v4());

        let first = table.get(EntityKind::MediaAsset, OLD_MEDIA).unwrap();
        assert!(table.get(EntityKind::MediaAsset, MISSING_MEDIA).is_none());
        assert_eq!(graph.media.len(), 1);
        assert_eq!(graph.media[0].model.id, first);
        assert_eq!(
            graph.characters[0].backstory,
            Some(format!("/api/media/{first} /api/media/{MISSING_MEDIA}"))
        );
    }

    #[test]
    fn empty_payloads_are_not_materialized() {
        let input = decoded(
            json!({
                "version": 1,
                "project": { "id": "p", "title": "T", "coverUrl": format!("/api/media/{OLD_MEDIA}") },
                "mediaAssets": [
                    { "id": OLD_MEDIA, "mimeType": "image/png", "zipPath": format!("media/{OLD_MEDIA}.png") }
                ]
            }),
            vec![(format!("media/{OLD_MEDIA}.png"), Vec::new())],
        );
        let (table, graph) = remap(input, Uuid::new_v4());

        assert!(table.get(EntityKind::MediaAsset, OLD_MEDIA).is_none());
        assert!(graph.media.is_empty());
        assert_eq!(graph.project.cover_url, Some(format!("/api/media/{OLD_MEDIA}")));
    }

    #[test]
    fn uppercase_references_are_rewritten() {
        let upper = OLD_MEDIA.to_ascii_uppercase();
        let input = decoded(
            json!({
                "version": 1,
                "project": { "id": "p", "title": "T", "coverUrl": format!("/api/media/{upper}") },
                "mediaAssets": [
                    { "id": OLD_MEDIA, "mimeType": "image/png", "zipPath": format!("media/{OLD_MEDIA}.png") }
                ]
            }),
            vec![(format!("media/{OLD_MEDIA}.png"), b"png".to_vec())],
        );
        let (table, graph) = remap(input, Uuid::new_v4());

        let new_media = table.get(EntityKind::MediaAsset, OLD_MEDIA).unwrap();
        assert_eq!(graph.media[0].model.id, new_media);
        assert_eq!(graph.project.cover_url, Some(format!("/api/media/{new_media}")));
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let input = decoded(
            json!({
                "version": 1,
                "project": { "id": "p", "title": "T", "settings": null },
                "documents": [{ "id": "d1", "title": "A", "type": null, "orderIndex": null, "status": null }],
                "characters": [
                    { "id": "a", "name": "A" },
                    { "id": "b", "name": "B" }
                ],
                "relationships": [{ "id": "r1", "characterAId": "a", "characterBId": "b", "isBidirectional": null }]
            }),
            vec![],
        );
        let (_, graph) = remap(input, Uuid::new_v4());

        let doc = &graph.documents[0];
        assert_eq!(doc.order_index, 0);
        assert_eq!(doc.status, "draft");
        assert_eq!(doc.kind, "chapter");
        assert!(!graph.relationships[0].is_bidirectional);
        assert_eq!(graph.project.settings, json!({}));
    }
}
