use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::backup::ImportCounts;
use crate::config::BackupConfig;
use crate::services::{
    AccessService, BlobStorage, ElasticsearchIndexer, LocalBlobStorage, NoopIndexer,
    SearchIndexer,
};

mod backup_operations;

/// Shared application context exposing the backup operations to the HTTP layer.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    access_service: Arc<AccessService>,
    blobs: Arc<dyn BlobStorage>,
    indexer: Arc<dyn SearchIndexer>,
    config: BackupConfig,
}

impl AppContext {
    /// Builds a context with local media storage and, when a search URL is
    /// configured, an Elasticsearch indexer.
    pub fn new(db: DatabaseConnection, config: BackupConfig) -> Self {
        let blobs: Arc<dyn BlobStorage> = Arc::new(LocalBlobStorage::new(config.media_dir.clone()));
        let indexer: Arc<dyn SearchIndexer> = match config.search_url.as_deref() {
            Some(url) => Arc::new(ElasticsearchIndexer::new(url)),
            None => Arc::new(NoopIndexer),
        };
        Self::with_services(db, config, blobs, indexer)
    }

    pub fn with_services(
        db: DatabaseConnection,
        config: BackupConfig,
        blobs: Arc<dyn BlobStorage>,
        indexer: Arc<dyn SearchIndexer>,
    ) -> Self {
        let access_service = Arc::new(AccessService::new(db.clone()));
        Self {
            db,
            access_service,
            blobs,
            indexer,
            config,
        }
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }
}

/// Downloadable export.
#[derive(Clone, Debug)]
pub struct BackupArchive {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub success: bool,
    pub project_id: Uuid,
    pub counts: ImportCounts,
}
