use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "characters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub role: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub profile: Json,
    #[sea_orm(column_type = "Json")]
    pub appearance: Json,
    #[sea_orm(column_type = "Json")]
    pub personality: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub backstory: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub speech_sample: Option<String>,
    pub image_url: Option<String>,
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
    #[sea_orm(has_many = "super::character_stats::Entity")]
    CharacterStats,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::character_stats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CharacterStats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
