use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_id: Option<Uuid>,
    #[sea_orm(column_name = "type")]
    pub kind: String, // "folder", "chapter", "scene" or "note"
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    pub order_index: i32,
    pub word_count: i32,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(has_many = "super::document_versions::Entity")]
    DocumentVersions,
    #[sea_orm(has_many = "super::document_comments::Entity")]
    DocumentComments,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::document_versions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentVersions.def()
    }
}

impl Related<super::document_comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentComments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
