use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Byte storage for media payloads, addressed by file name.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Writes `bytes` under `name` and returns the full storage path.
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Reads a payload. A missing file yields `Ok(None)`.
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>>;

    async fn delete_file(&self, path: &str) -> Result<()>;
}

/// Stores payloads as plain files inside one directory.
#[derive(Clone, Debug)]
pub struct LocalBlobStorage {
    root: PathBuf,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create media dir {}", self.root.display()))?;
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path)),
        }
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to delete {}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cowrite_test_utils::TempDir;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = LocalBlobStorage::new(dir.path().join("media"));

        let path = storage.write_file("a.png", b"0123456789").await.unwrap();
        assert_eq!(
            storage.read_file(&path).await.unwrap(),
            Some(b"0123456789".to_vec())
        );

        storage.delete_file(&path).await.unwrap();
        assert_eq!(storage.read_file(&path).await.unwrap(), None);
        // Deleting twice is not an error
        storage.delete_file(&path).await.unwrap();
        assert!(dir.path().join("media").is_dir());
    }
}
