//! Backup archive encoding and decoding.
//!
//! An archive is a ZIP holding `backup.json` plus one `media/{id}{ext}` entry
//! per included asset. Decoding also accepts a bare `backup.json` document.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::{Component, Path};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use zip::{result::ZipError, write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

use super::bundle::{
    AudioAssetRecord, BackupBundle, CharacterRecord, CharacterStatRecord, DocumentCommentRecord,
    DocumentRecord, DocumentVersionRecord, MediaAssetRecord, PlotPointRecord, PlotRecord,
    ProjectRecord, ReaderPredictionRecord, RelationshipRecord, ResearchItemRecord,
    StoryboardRecord, TranslationRecord, WorldSettingRecord, WritingGoalRecord,
};
use super::reader::ProjectGraph;
use crate::errors::BundleError;
use crate::services::BlobStorage;

pub const BACKUP_FORMAT_VERSION: u32 = 1;
pub const METADATA_ENTRY: &str = "backup.json";
pub const MEDIA_PREFIX: &str = "media/";
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

const MAX_TITLE_CHARS: usize = 80;

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("filename pattern is valid"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Parsed upload: the metadata document plus the payloads it points at,
/// keyed by archive path.
#[derive(Debug, Default)]
pub struct DecodedBundle {
    pub bundle: BackupBundle,
    pub payloads: HashMap<String, Vec<u8>>,
}

impl DecodedBundle {
    pub fn payload_for(&self, record: &MediaAssetRecord) -> Option<&[u8]> {
        record
            .zip_path
            .as_deref()
            .and_then(|path| self.payloads.get(path))
            .map(Vec::as_slice)
    }
}

pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => Some(".png"),
        "image/jpeg" | "image/jpg" => Some(".jpg"),
        "image/webp" => Some(".webp"),
        "image/gif" => Some(".gif"),
        "image/svg+xml" => Some(".svg"),
        _ => None,
    }
}

/// Extension for a stored asset: from the mime type, else from the stored
/// file name, else empty.
pub fn media_extension(mime_type: &str, storage_path: &str) -> String {
    if let Some(ext) = extension_for_mime(mime_type) {
        return ext.to_string();
    }
    Path::new(storage_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| is_plain_extension(ext))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Accepts `png` or `.png` style extensions of short alphanumeric text.
pub fn is_plain_extension(ext: &str) -> bool {
    let bare = ext.strip_prefix('.').unwrap_or(ext);
    !bare.is_empty() && bare.len() <= 10 && bare.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn sanitize_title(title: &str) -> String {
    let replaced = UNSAFE_FILENAME_CHARS.replace_all(title.trim(), "_");
    let collapsed = WHITESPACE_RUN.replace_all(&replaced, "_");
    let truncated: String = collapsed.chars().take(MAX_TITLE_CHARS).collect();
    if truncated.is_empty() {
        "cowrite".to_string()
    } else {
        truncated
    }
}

/// `{title}_backup_{YYYYMMDDHHMMSS}.zip`
pub fn backup_filename(title: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_backup_{}.zip",
        sanitize_title(title),
        at.format("%Y%m%d%H%M%S")
    )
}

fn is_safe_entry_path(path: &str) -> bool {
    let candidate = Path::new(path);
    !path.is_empty()
        && !path.starts_with('/')
        && !path.starts_with('\\')
        && !candidate.is_absolute()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && !path.split(&['/', '\\'][..]).any(|part| part == "..")
}

/// Builds the metadata document for `graph`. `media` lists the assets whose
/// payloads made it into the archive.
pub fn build_bundle(
    graph: &ProjectGraph,
    media: Vec<MediaAssetRecord>,
    exported_at: DateTime<Utc>,
) -> BackupBundle {
    BackupBundle {
        version: BACKUP_FORMAT_VERSION,
        exported_at: exported_at.to_rfc3339(),
        project: ProjectRecord::from(&graph.project),
        documents: graph.documents.iter().map(DocumentRecord::from).collect(),
        document_versions: graph
            .document_versions
            .iter()
            .map(DocumentVersionRecord::from)
            .collect(),
        document_comments: graph
            .document_comments
            .iter()
            .map(DocumentCommentRecord::from)
            .collect(),
        characters: graph.characters.iter().map(CharacterRecord::from).collect(),
        character_stats: graph
            .character_stats
            .iter()
            .map(CharacterStatRecord::from)
            .collect(),
        world_settings: graph
            .world_settings
            .iter()
            .map(WorldSettingRecord::from)
            .collect(),
        relationships: graph
            .relationships
            .iter()
            .map(RelationshipRecord::from)
            .collect(),
        plots: graph.plots.iter().map(PlotRecord::from).collect(),
        plot_points: graph.plot_points.iter().map(PlotPointRecord::from).collect(),
        writing_goals: graph
            .writing_goals
            .iter()
            .map(WritingGoalRecord::from)
            .collect(),
        research_items: graph
            .research_items
            .iter()
            .map(ResearchItemRecord::from)
            .collect(),
        translations: graph
            .translations
            .iter()
            .map(TranslationRecord::from)
            .collect(),
        audio_assets: graph
            .audio_assets
            .iter()
            .map(AudioAssetRecord::from)
            .collect(),
        storyboards: graph
            .storyboards
            .iter()
            .map(StoryboardRecord::from)
            .collect(),
        reader_predictions: graph
            .reader_predictions
            .iter()
            .map(ReaderPredictionRecord::from)
            .collect(),
        media_assets: media,
    }
}

/// Serializes `graph` into archive bytes, pulling media payloads from `blobs`.
/// Assets whose files are gone are left out of the archive entirely.
pub async fn encode_backup(
    graph: &ProjectGraph,
    blobs: &dyn BlobStorage,
    exported_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let mut media_records = Vec::new();
    let mut payloads = Vec::new();

    for asset in &graph.media {
        let ext = media_extension(&asset.mime_type, &asset.storage_path);
        let zip_path = format!("{}{}{}", MEDIA_PREFIX, asset.id, ext);

        match blobs.read_file(&asset.storage_path).await {
            Ok(Some(bytes)) => {
                media_records.push(MediaAssetRecord::from_model(asset, zip_path.clone(), ext));
                payloads.push((zip_path, bytes));
            }
            Ok(None) => {
                warn!(media_id = %asset.id, "media file missing, leaving asset out of backup");
            }
            Err(err) => {
                warn!(media_id = %asset.id, "media file unreadable, leaving asset out of backup: {:#}", err);
            }
        }
    }

    let bundle = build_bundle(graph, media_records, exported_at);
    write_archive(&bundle, &payloads)
}

pub fn write_archive(bundle: &BackupBundle, payloads: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let metadata = serde_json::to_vec_pretty(bundle).context("Failed to serialize backup.json")?;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(METADATA_ENTRY, options)
            .map_err(|e| anyhow!("Failed to add {}: {}", METADATA_ENTRY, e))?;
        zip.write_all(&metadata)
            .map_err(|e| anyhow!("Failed to write {}: {}", METADATA_ENTRY, e))?;

        for (path, bytes) in payloads {
            zip.start_file(path.clone(), options)
                .map_err(|e| anyhow!("Failed to add {}: {}", path, e))?;
            zip.write_all(bytes)
                .map_err(|e| anyhow!("Failed to write {}: {}", path, e))?;
        }

        zip.finish()
            .map_err(|e| anyhow!("Failed to finalize backup archive: {}", e))?;
    }

    Ok(cursor.into_inner())
}

fn read_zip_file_bytes<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer)
                .map_err(|e| anyhow!("Failed to read {}: {}", path, e))?;
            Ok(Some(buffer))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(anyhow!("Archive entry {} unreadable: {}", path, e)),
    }
}

/// Parses an uploaded backup without touching any store.
///
/// ZIP input is tried first; if that fails for any reason the whole input is
/// parsed as a bare `backup.json`.
pub fn decode_backup(bytes: &[u8]) -> Result<DecodedBundle, BundleError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).ok();

    let metadata = archive
        .as_mut()
        .and_then(|archive| read_zip_file_bytes(archive, METADATA_ENTRY).ok().flatten())
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok());

    let document = match metadata {
        Some(value) => value,
        None => {
            // Text-only backups carry no archive at all
            archive = None;
            serde_json::from_slice::<Value>(bytes).map_err(|_| {
                BundleError::Unreadable("not a backup archive or backup document".to_string())
            })?
        }
    };

    let bundle = parse_bundle_document(document)?;

    let mut payloads = HashMap::new();
    if let Some(archive) = archive.as_mut() {
        for record in &bundle.media_assets {
            let Some(path) = record.zip_path.as_deref() else {
                continue;
            };
            if !is_safe_entry_path(path) {
                debug!(path, "ignoring unsafe media path in backup");
                continue;
            }
            match read_zip_file_bytes(archive, path) {
                Ok(Some(bytes)) => {
                    payloads.insert(path.to_string(), bytes);
                }
                Ok(None) => debug!(path, "media payload absent from archive"),
                Err(err) => warn!(path, "skipping unreadable media payload: {:#}", err),
            }
        }
    }

    Ok(DecodedBundle { bundle, payloads })
}

fn parse_bundle_document(document: Value) -> Result<BackupBundle, BundleError> {
    if !document.is_object() {
        return Err(BundleError::Unreadable(
            "backup document is not a JSON object".to_string(),
        ));
    }

    match document.get("version") {
        Some(Value::Number(n)) if n.as_u64() == Some(BACKUP_FORMAT_VERSION as u64) => {}
        Some(other) => return Err(BundleError::UnsupportedVersion(other.to_string())),
        None => return Err(BundleError::UnsupportedVersion("missing".to_string())),
    }

    serde_json::from_value(document)
        .map_err(|e| BundleError::Unreadable(format!("malformed backup document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn mime_types_map_to_extensions() {
        assert_eq!(extension_for_mime("image/png"), Some(".png"));
        assert_eq!(extension_for_mime("image/jpeg"), Some(".jpg"));
        assert_eq!(extension_for_mime("image/svg+xml"), Some(".svg"));
        assert_eq!(extension_for_mime("application/pdf"), None);

        assert_eq!(media_extension("image/webp", "/x/a.bin"), ".webp");
        assert_eq!(media_extension("application/pdf", "/x/a.pdf"), ".pdf");
        assert_eq!(media_extension("application/octet-stream", "/x/a"), "");
    }

    #[test]
    fn filename_is_sanitized_and_timestamped() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 7).unwrap();
        assert_eq!(
            backup_filename("My  Novel: Part 1/2?", at),
            "My_Novel__Part_1_2__backup_20260105093007.zip"
        );
        assert_eq!(backup_filename("   ", at), "cowrite_backup_20260105093007.zip");

        let long = "가".repeat(100);
        assert_eq!(sanitize_title(&long).chars().count(), 80);
    }

    #[test]
    fn rejects_unsafe_entry_paths() {
        assert!(is_safe_entry_path("media/abc.png"));
        assert!(!is_safe_entry_path("../etc/passwd"));
        assert!(!is_safe_entry_path("media/../../x"));
        assert!(!is_safe_entry_path("/abs/path.png"));
        assert!(!is_safe_entry_path(""));
    }

    #[test]
    fn decodes_archive_with_media() {
        let bundle: BackupBundle = serde_json::from_value(json!({
            "version": 1,
            "exportedAt": "2026-01-05T00:00:00Z",
            "project": { "id": "p", "title": "T" },
            "mediaAssets": [
                { "id": "m1", "mimeType": "image/png", "url": "/api/media/m1", "zipPath": "media/m1.png", "ext": ".png" },
                { "id": "m2", "mimeType": "image/png", "url": "/api/media/m2", "zipPath": "media/m2.png", "ext": ".png" },
                { "id": "m3", "mimeType": "image/png", "url": "/api/media/m3", "zipPath": "../m3.png", "ext": ".png" }
            ]
        }))
        .unwrap();
        let bytes = write_archive(
            &bundle,
            &[
                ("media/m1.png".to_string(), b"0123456789".to_vec()),
                ("../m3.png".to_string(), b"evil".to_vec()),
            ],
        )
        .unwrap();

        let decoded = decode_backup(&bytes).unwrap();
        assert_eq!(decoded.bundle.media_assets.len(), 3);
        assert_eq!(
            decoded.payload_for(&decoded.bundle.media_assets[0]),
            Some(&b"0123456789"[..])
        );
        assert!(decoded.payload_for(&decoded.bundle.media_assets[1]).is_none());
        assert!(decoded.payload_for(&decoded.bundle.media_assets[2]).is_none());
    }

    #[test]
    fn accepts_bare_metadata_document() {
        let raw = br#"{"version":1,"exportedAt":"2026-01-05T00:00:00Z","project":{"id":"p","title":"T"},"documents":[{"id":"d1","title":"One"}]}"#;
        let decoded = decode_backup(raw).unwrap();
        assert_eq!(decoded.bundle.documents.len(), 1);
        assert!(decoded.payloads.is_empty());
    }

    #[test]
    fn null_fields_do_not_make_a_document_unreadable() {
        let raw = br#"{"version":1,"project":{"id":"p","title":"T"},"documents":[{"id":"d1","title":"A","orderIndex":null,"status":null}]}"#;
        let decoded = decode_backup(raw).unwrap();
        assert_eq!(decoded.bundle.documents[0].order_index, 0);
    }

    #[test]
    fn version_mismatch_is_distinct_from_garbage() {
        let err = decode_backup(br#"{"version":2,"project":{}}"#).unwrap_err();
        assert!(matches!(err, BundleError::UnsupportedVersion(ref v) if v == "2"));

        let err = decode_backup(br#"{"project":{}}"#).unwrap_err();
        assert!(err.is_version_error());

        let err = decode_backup(b"\x00\x01 definitely not a backup").unwrap_err();
        assert!(matches!(err, BundleError::Unreadable(_)));
    }

    #[test]
    fn archive_version_is_checked_too() {
        let bundle = BackupBundle {
            version: 7,
            ..Default::default()
        };
        let bytes = write_archive(&bundle, &[]).unwrap();
        let err = decode_backup(&bytes).unwrap_err();
        assert!(matches!(err, BundleError::UnsupportedVersion(ref v) if v == "7"));
    }
}
