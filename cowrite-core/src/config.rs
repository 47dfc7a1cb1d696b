use std::path::PathBuf;

pub const DEFAULT_MEDIA_DIR: &str = "/app/uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Settings for the backup engine and its collaborators.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory holding media payloads, one file per asset.
    pub media_dir: PathBuf,
    /// Largest accepted import upload in bytes.
    pub max_upload_bytes: usize,
    /// Base URL of the search cluster. Indexing is disabled when unset.
    pub search_url: Option<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from(DEFAULT_MEDIA_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            search_url: None,
        }
    }
}

impl BackupConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            media_dir: std::env::var("MEDIA_UPLOAD_DIR")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.media_dir),
            max_upload_bytes: std::env::var("COWRITE_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|value| value.trim().parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.max_upload_bytes),
            search_url: std::env::var("SEARCH_URL")
                .ok()
                .map(|value| value.trim().trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty()),
        }
    }

    pub fn with_media_dir(mut self, media_dir: impl Into<PathBuf>) -> Self {
        self.media_dir = media_dir.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_layout() {
        let config = BackupConfig::default();
        assert_eq!(config.media_dir, PathBuf::from("/app/uploads"));
        assert_eq!(config.max_upload_bytes, 52_428_800);
        assert!(config.search_url.is_none());
    }
}
