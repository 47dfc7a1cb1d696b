pub mod access_service;
pub mod blob_storage;
pub mod search_indexer;

pub use access_service::AccessService;
pub use blob_storage::{BlobStorage, LocalBlobStorage};
pub use search_indexer::{ElasticsearchIndexer, NoopIndexer, SearchIndexer};
