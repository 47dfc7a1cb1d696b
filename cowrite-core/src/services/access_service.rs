use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::auth::Actor;
use crate::database::entities::{project_members, projects};
use crate::errors::{CoreError, CoreResult};

/// Project-level access checks used by the backup operations.
#[derive(Clone, Debug)]
pub struct AccessService {
    db: DatabaseConnection,
}

impl AccessService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// True when the actor owns the project or is one of its members.
    /// Missing projects report `false`; callers decide between 403 and 404.
    pub async fn has_access(&self, actor: &Actor, project_id: Uuid) -> CoreResult<bool> {
        if actor.is_system() {
            return Ok(true);
        }
        let Some(user_id) = actor.user_id else {
            return Ok(false);
        };

        let project = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::internal(format!("Database error: {}", e)))?;
        let Some(project) = project else {
            return Ok(false);
        };
        if project.owner_id == user_id {
            return Ok(true);
        }

        let memberships = project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(project_id))
            .filter(project_members::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| CoreError::internal(format!("Database error: {}", e)))?;

        Ok(memberships > 0)
    }

    pub async fn assert_access(&self, actor: &Actor, project_id: Uuid) -> CoreResult<()> {
        if self.has_access(actor, project_id).await? {
            Ok(())
        } else {
            Err(CoreError::forbidden(format!(
                "No access to project {}",
                project_id
            )))
        }
    }

    pub async fn assert_owner(&self, actor: &Actor, project_id: Uuid) -> CoreResult<()> {
        if actor.is_system() {
            return Ok(());
        }
        let user_id = actor.require_user()?;

        let project = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::internal(format!("Database error: {}", e)))?
            .ok_or_else(|| CoreError::not_found("Project", project_id.to_string()))?;

        if project.owner_id != user_id {
            return Err(CoreError::forbidden("Only the project owner can do this"));
        }
        Ok(())
    }
}
