use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

pub const PROJECTS_INDEX: &str = "projects";
pub const DOCUMENTS_INDEX: &str = "documents";
pub const CHARACTERS_INDEX: &str = "characters";
pub const WORLD_SETTINGS_INDEX: &str = "world_settings";
pub const PLOTS_INDEX: &str = "plots";

#[async_trait]
pub trait SearchIndexer: Send + Sync {
    async fn index_document(&self, index: &str, id: &str, body: Value) -> Result<()>;
}

/// Submits a document and logs failures instead of returning them.
pub async fn index_best_effort(indexer: &dyn SearchIndexer, index: &str, id: &str, body: Value) {
    if let Err(err) = indexer.index_document(index, id, body).await {
        warn!(index, id, "search indexing failed: {:#}", err);
    }
}

/// Indexer used when no search cluster is configured.
#[derive(Clone, Debug, Default)]
pub struct NoopIndexer;

#[async_trait]
impl SearchIndexer for NoopIndexer {
    async fn index_document(&self, _index: &str, _id: &str, _body: Value) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ElasticsearchIndexer {
    client: reqwest::Client,
    base_url: String,
}

impl ElasticsearchIndexer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchIndexer for ElasticsearchIndexer {
    async fn index_document(&self, index: &str, id: &str, body: Value) -> Result<()> {
        let url = format!("{}/{}/_doc/{}?refresh=wait_for", self.base_url, index, id);
        self.client
            .put(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("search cluster rejected {}/{}", index, id))?;
        Ok(())
    }
}
