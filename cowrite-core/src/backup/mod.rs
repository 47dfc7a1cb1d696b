//! Project backup engine: read a project graph, encode it into an archive,
//! and rebuild it under fresh identities on import.

pub mod bundle;
pub mod codec;
pub mod reader;
pub mod remap;
pub mod scanner;
pub mod writer;

pub use bundle::BackupBundle;
pub use codec::{decode_backup, encode_backup, DecodedBundle, ARCHIVE_MIME_TYPE};
pub use reader::{read_project_graph, ProjectGraph};
pub use remap::{IdentityRemapper, ImportCounts, RemapTable, RemappedGraph};
pub use scanner::ReferenceScanner;
pub use writer::GraphWriter;
