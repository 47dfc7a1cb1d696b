use chrono::Utc;
use sea_orm::EntityTrait;
use tracing::{error, info};
use uuid::Uuid;

use super::{AppContext, BackupArchive, ImportSummary};
use crate::auth::Actor;
use crate::backup::codec::{backup_filename, decode_backup, encode_backup, ARCHIVE_MIME_TYPE};
use crate::backup::{read_project_graph, GraphWriter, IdentityRemapper, RemapTable};
use crate::database::entities::projects;
use crate::errors::{CoreError, CoreResult};

impl AppContext {
    /// Packs the whole project, including its media, into one archive.
    pub async fn export_project_backup(
        &self,
        actor: &Actor,
        project_id: Uuid,
    ) -> CoreResult<BackupArchive> {
        if !actor.is_authenticated() {
            return Err(CoreError::unauthorized("Authentication required"));
        }

        self.access_service.assert_access(actor, project_id).await?;

        let project = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::internal(format!("Failed to load project {}: {}", project_id, e)))?
            .ok_or_else(|| CoreError::not_found("Project", project_id.to_string()))?;

        if project.is_deleted() {
            return Err(CoreError::not_found("Project", project_id.to_string()));
        }

        info!(%project_id, "exporting project backup");
        let title = project.title.clone();
        let graph = read_project_graph(&self.db, project)
            .await
            .map_err(|e| CoreError::internal(format!("Failed to read project {}: {}", project_id, e)))?;

        let exported_at = Utc::now();
        let bytes = encode_backup(&graph, self.blobs.as_ref(), exported_at)
            .await
            .map_err(|e| CoreError::internal(format!("Failed to build backup archive: {:#}", e)))?;

        info!(
            %project_id,
            documents = graph.documents.len(),
            characters = graph.characters.len(),
            media = graph.media.len(),
            bytes = bytes.len(),
            "project backup exported"
        );

        Ok(BackupArchive {
            filename: backup_filename(&title, exported_at),
            mime_type: ARCHIVE_MIME_TYPE,
            bytes,
        })
    }

    /// Recreates a project from an uploaded backup under fresh identities,
    /// owned by `actor`.
    pub async fn import_project_backup(
        &self,
        actor: &Actor,
        bytes: &[u8],
    ) -> CoreResult<ImportSummary> {
        let owner_id = actor.require_user()?;

        if bytes.is_empty() {
            return Err(CoreError::validation("Backup file is required"));
        }
        if bytes.len() > self.config.max_upload_bytes {
            return Err(CoreError::payload_too_large(self.config.max_upload_bytes));
        }

        let decoded = decode_backup(bytes)?;

        let table = RemapTable::build(&decoded);
        let remapped = IdentityRemapper::new(owner_id, Utc::now()).remap(decoded, &table);
        let counts = remapped.counts();
        info!(
            project_id = %table.project_id(),
            %owner_id,
            ids = table.len(),
            documents = counts.documents,
            media = counts.media_assets,
            dropped = counts.dropped,
            "importing project backup"
        );

        let writer = GraphWriter::new(&self.db, self.blobs.as_ref(), self.indexer.as_ref());
        let project_id = writer.write(remapped).await.map_err(|err| {
            error!(%owner_id, "project import failed: {:#}", err);
            CoreError::write_failure(err)
        })?;

        Ok(ImportSummary {
            success: true,
            project_id,
            counts,
        })
    }
}
