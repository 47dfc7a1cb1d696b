//! Serialized form of a project backup (`backup.json`).
//!
//! Record ids are kept as opaque strings: they only need to be unique within
//! one bundle and are never written back to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::database::entities::{
    audio_assets, character_stats, characters, document_comments, document_versions, documents,
    media_assets, plot_points, plots, projects, reader_predictions, relationships,
    research_items, storyboards, translations, world_settings, writing_goals,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupBundle {
    #[serde(deserialize_with = "null_as_default")]
    pub version: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub exported_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project: ProjectRecord,
    #[serde(deserialize_with = "null_as_default")]
    pub documents: Vec<DocumentRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub document_versions: Vec<DocumentVersionRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub document_comments: Vec<DocumentCommentRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub characters: Vec<CharacterRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub character_stats: Vec<CharacterStatRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub world_settings: Vec<WorldSettingRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub relationships: Vec<RelationshipRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub plots: Vec<PlotRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub plot_points: Vec<PlotPointRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub writing_goals: Vec<WritingGoalRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub research_items: Vec<ResearchItemRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub translations: Vec<TranslationRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_assets: Vec<AudioAssetRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub storyboards: Vec<StoryboardRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub reader_predictions: Vec<ReaderPredictionRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub media_assets: Vec<MediaAssetRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
    pub settings: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub word_count: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub is_public: bool,
    /// Informational only. Imports always belong to the importing user.
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    #[serde(deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub content: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub order_index: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub word_count: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentVersionRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub document_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    pub word_count: Option<i32>,
    pub version_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentCommentRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub document_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    pub position: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub role: Option<String>,
    pub profile: Value,
    pub appearance: Value,
    pub personality: Value,
    pub backstory: Option<String>,
    pub speech_sample: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterStatRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub character_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub template_type: String,
    pub stats: Value,
    pub episode_num: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldSettingRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub parent_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub content: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "characterAId")]
    #[serde(deserialize_with = "null_as_default")]
    pub character_a_id: String,
    #[serde(rename = "characterBId")]
    #[serde(deserialize_with = "null_as_default")]
    pub character_b_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub relation_type: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_bidirectional: bool,
    pub metadata: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlotRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub order_index: i32,
    pub metadata: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlotPointRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plot_id: String,
    pub document_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub order_index: i32,
    pub metadata: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WritingGoalRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub goal_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_words: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub current_words: i32,
    /// `YYYY-MM-DD`; longer ISO timestamps are truncated to their date on import.
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchItemRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub query: String,
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub document_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_language: String,
    pub provider: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioAssetRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub document_id: String,
    pub voice: Option<String>,
    pub provider: Option<String>,
    pub script: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryboardRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub document_id: String,
    pub provider: Option<String>,
    pub content: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderPredictionRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub document_id: String,
    pub provider: Option<String>,
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaAssetRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub project_id: Option<String>,
    pub original_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub mime_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Archive entry holding the payload, e.g. `media/{id}.png`.
    pub zip_path: Option<String>,
    pub ext: Option<String>,
}

/// Reads an explicit `null` as the type's default, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn opt_id(id: Option<uuid::Uuid>) -> Option<String> {
    id.map(|id| id.to_string())
}

impl From<&projects::Model> for ProjectRecord {
    fn from(model: &projects::Model) -> Self {
        Self {
            id: model.id.to_string(),
            title: model.title.clone(),
            description: model.description.clone(),
            genre: model.genre.clone(),
            cover_url: model.cover_url.clone(),
            settings: model.settings.clone(),
            word_count: model.word_count,
            is_public: model.is_public,
            owner_id: Some(model.owner_id.to_string()),
        }
    }
}

impl From<&documents::Model> for DocumentRecord {
    fn from(model: &documents::Model) -> Self {
        Self {
            id: model.id.to_string(),
            parent_id: opt_id(model.parent_id),
            kind: model.kind.clone(),
            title: model.title.clone(),
            content: model.content.clone(),
            order_index: model.order_index,
            word_count: model.word_count,
            status: model.status.clone(),
            notes: model.notes.clone(),
        }
    }
}

impl From<&document_versions::Model> for DocumentVersionRecord {
    fn from(model: &document_versions::Model) -> Self {
        Self {
            id: model.id.to_string(),
            document_id: model.document_id.to_string(),
            content: model.content.clone(),
            word_count: model.word_count,
            version_name: model.version_name.clone(),
            created_at: Some(model.created_at),
        }
    }
}

impl From<&document_comments::Model> for DocumentCommentRecord {
    fn from(model: &document_comments::Model) -> Self {
        Self {
            id: model.id.to_string(),
            document_id: model.document_id.to_string(),
            content: model.content.clone(),
            position: model.position.clone(),
            created_at: Some(model.created_at),
        }
    }
}

impl From<&characters::Model> for CharacterRecord {
    fn from(model: &characters::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name.clone(),
            role: model.role.clone(),
            profile: model.profile.clone(),
            appearance: model.appearance.clone(),
            personality: model.personality.clone(),
            backstory: model.backstory.clone(),
            speech_sample: model.speech_sample.clone(),
            image_url: model.image_url.clone(),
        }
    }
}

impl From<&character_stats::Model> for CharacterStatRecord {
    fn from(model: &character_stats::Model) -> Self {
        Self {
            id: model.id.to_string(),
            character_id: model.character_id.to_string(),
            template_type: model.template_type.clone(),
            stats: model.stats.clone(),
            episode_num: model.episode_num,
        }
    }
}

impl From<&world_settings::Model> for WorldSettingRecord {
    fn from(model: &world_settings::Model) -> Self {
        Self {
            id: model.id.to_string(),
            parent_id: opt_id(model.parent_id),
            category: model.category.clone(),
            title: model.title.clone(),
            content: model.content.clone(),
            metadata: model.metadata.clone(),
        }
    }
}

impl From<&relationships::Model> for RelationshipRecord {
    fn from(model: &relationships::Model) -> Self {
        Self {
            id: model.id.to_string(),
            character_a_id: model.character_a_id.to_string(),
            character_b_id: model.character_b_id.to_string(),
            relation_type: model.relation_type.clone(),
            description: model.description.clone(),
            is_bidirectional: model.is_bidirectional,
            metadata: model.metadata.clone(),
        }
    }
}

impl From<&plots::Model> for PlotRecord {
    fn from(model: &plots::Model) -> Self {
        Self {
            id: model.id.to_string(),
            title: model.title.clone(),
            description: model.description.clone(),
            order_index: model.order_index,
            metadata: model.metadata.clone(),
        }
    }
}

impl From<&plot_points::Model> for PlotPointRecord {
    fn from(model: &plot_points::Model) -> Self {
        Self {
            id: model.id.to_string(),
            plot_id: model.plot_id.to_string(),
            document_id: opt_id(model.document_id),
            title: model.title.clone(),
            description: model.description.clone(),
            order_index: model.order_index,
            metadata: model.metadata.clone(),
        }
    }
}

impl From<&writing_goals::Model> for WritingGoalRecord {
    fn from(model: &writing_goals::Model) -> Self {
        Self {
            id: model.id.to_string(),
            goal_type: model.goal_type.clone(),
            target_words: model.target_words,
            current_words: model.current_words,
            due_date: model.due_date.map(|date| date.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&research_items::Model> for ResearchItemRecord {
    fn from(model: &research_items::Model) -> Self {
        Self {
            id: model.id.to_string(),
            query: model.query.clone(),
            result: model.result.clone(),
        }
    }
}

impl From<&translations::Model> for TranslationRecord {
    fn from(model: &translations::Model) -> Self {
        Self {
            id: model.id.to_string(),
            document_id: model.document_id.to_string(),
            target_language: model.target_language.clone(),
            provider: model.provider.clone(),
            content: model.content.clone(),
        }
    }
}

impl From<&audio_assets::Model> for AudioAssetRecord {
    fn from(model: &audio_assets::Model) -> Self {
        Self {
            id: model.id.to_string(),
            document_id: model.document_id.to_string(),
            voice: model.voice.clone(),
            provider: model.provider.clone(),
            script: model.script.clone(),
            audio_url: model.audio_url.clone(),
        }
    }
}

impl From<&storyboards::Model> for StoryboardRecord {
    fn from(model: &storyboards::Model) -> Self {
        Self {
            id: model.id.to_string(),
            document_id: model.document_id.to_string(),
            provider: model.provider.clone(),
            content: model.content.clone(),
        }
    }
}

impl From<&reader_predictions::Model> for ReaderPredictionRecord {
    fn from(model: &reader_predictions::Model) -> Self {
        Self {
            id: model.id.to_string(),
            document_id: model.document_id.to_string(),
            provider: model.provider.clone(),
            result: model.result.clone(),
        }
    }
}

impl MediaAssetRecord {
    pub fn from_model(model: &media_assets::Model, zip_path: String, ext: String) -> Self {
        Self {
            id: model.id.to_string(),
            project_id: opt_id(model.project_id),
            original_name: model.original_name.clone(),
            mime_type: model.mime_type.clone(),
            size: model.size,
            url: model.url.clone(),
            zip_path: Some(zip_path),
            ext: Some(ext),
        }
    }
}
