#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use cowrite::config::BackupConfig;
use cowrite::database::entities::{characters, documents, media_assets, project_members, projects};
use cowrite::database::migrations::Migrator;
use cowrite::services::{BlobStorage, LocalBlobStorage, NoopIndexer, SearchIndexer};
use cowrite::AppContext;
use cowrite_test_utils::{TempDir, TestDb};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use uuid::Uuid;

pub struct Harness {
    pub db: DatabaseConnection,
    pub media: TempDir,
    pub app: AppContext,
}

pub async fn migrated_db() -> Result<DatabaseConnection> {
    let db = TestDb::new_in_memory().connect().await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn harness() -> Result<Harness> {
    let media = TempDir::new()?;
    let blobs = Arc::new(LocalBlobStorage::new(media.path()));
    harness_with(media, blobs, Arc::new(NoopIndexer)).await
}

pub async fn harness_with(
    media: TempDir,
    blobs: Arc<dyn BlobStorage>,
    indexer: Arc<dyn SearchIndexer>,
) -> Result<Harness> {
    let db = migrated_db().await?;
    let config = BackupConfig::default()
        .with_media_dir(media.path())
        .with_max_upload_bytes(1024 * 1024);
    let app = AppContext::with_services(db.clone(), config, blobs, indexer);
    Ok(Harness { db, media, app })
}

pub async fn insert_project(
    db: &DatabaseConnection,
    owner_id: Uuid,
    title: &str,
) -> Result<projects::Model> {
    let now = Utc::now();
    let project = projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        title: Set(title.to_string()),
        description: Set(Some("A story about backups".to_string())),
        genre: Set(Some("fantasy".to_string())),
        cover_url: Set(None),
        settings: Set(json!({ "theme": "dark" })),
        word_count: Set(1200),
        is_public: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(db)
    .await?;
    Ok(project)
}

pub async fn add_member(db: &DatabaseConnection, project_id: Uuid, user_id: Uuid) -> Result<()> {
    project_members::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project_id),
        user_id: Set(user_id),
        role: Set("editor".to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    Ok(())
}

pub async fn insert_document(
    db: &DatabaseConnection,
    project_id: Uuid,
    parent_id: Option<Uuid>,
    title: &str,
    content: Option<&str>,
) -> Result<documents::Model> {
    let now = Utc::now();
    let document = documents::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project_id),
        parent_id: Set(parent_id),
        kind: Set(if parent_id.is_some() { "scene" } else { "chapter" }.to_string()),
        title: Set(title.to_string()),
        content: Set(content.map(str::to_string)),
        order_index: Set(0),
        word_count: Set(3),
        status: Set("draft".to_string()),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(document)
}

pub async fn insert_character(
    db: &DatabaseConnection,
    project_id: Uuid,
    name: &str,
    image_url: Option<String>,
    backstory: Option<String>,
) -> Result<characters::Model> {
    let now = Utc::now();
    let character = characters::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project_id),
        name: Set(name.to_string()),
        role: Set(Some("protagonist".to_string())),
        profile: Set(json!({ "age": 30 })),
        appearance: Set(json!({})),
        personality: Set(json!({ "traits": ["stubborn"] })),
        backstory: Set(backstory),
        speech_sample: Set(None),
        image_url: Set(image_url),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(character)
}

/// Writes `bytes` into the media dir and registers the asset.
pub async fn insert_media(
    harness: &Harness,
    owner_id: Uuid,
    project_id: Option<Uuid>,
    bytes: &[u8],
) -> Result<media_assets::Model> {
    let id = Uuid::new_v4();
    let path = harness.media.path().join(format!("{}.png", id));
    std::fs::write(&path, bytes)?;

    let media = media_assets::ActiveModel {
        id: Set(id),
        user_id: Set(owner_id),
        project_id: Set(project_id),
        original_name: Set(Some("portrait.png".to_string())),
        mime_type: Set("image/png".to_string()),
        size: Set(bytes.len() as i64),
        storage_path: Set(path.to_string_lossy().to_string()),
        url: Set(format!("/api/media/{}", id)),
        created_at: Set(Utc::now()),
    }
    .insert(&harness.db)
    .await?;
    Ok(media)
}

/// Local storage that fails the Nth write (1-based) and records the names it
/// was asked to write.
pub struct FailingBlobStorage {
    inner: LocalBlobStorage,
    fail_on: usize,
    writes: AtomicUsize,
    pub attempted: Mutex<Vec<String>>,
}

impl FailingBlobStorage {
    pub fn new(dir: std::path::PathBuf, fail_on: usize) -> Self {
        Self {
            inner: LocalBlobStorage::new(dir),
            fail_on,
            writes: AtomicUsize::new(0),
            attempted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BlobStorage for FailingBlobStorage {
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<String> {
        if let Ok(mut attempted) = self.attempted.lock() {
            attempted.push(name.to_string());
        }
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on {
            anyhow::bail!("simulated storage failure on write {}", n);
        }
        self.inner.write_file(name, bytes).await
    }

    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.inner.read_file(path).await
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        self.inner.delete_file(path).await
    }
}

/// Records every submission; optionally fails all of them.
#[derive(Default)]
pub struct RecordingIndexer {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, String, Value)>>,
}

#[async_trait]
impl SearchIndexer for RecordingIndexer {
    async fn index_document(&self, index: &str, id: &str, body: Value) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((index.to_string(), id.to_string(), body));
        }
        if self.fail {
            anyhow::bail!("search cluster unavailable");
        }
        Ok(())
    }
}
