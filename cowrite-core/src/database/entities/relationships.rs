use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "relationships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub character_a_id: Uuid,
    pub character_b_id: Uuid,
    pub relation_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub is_bidirectional: bool,
    #[sea_orm(column_type = "Json")]
    pub metadata: Json,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::characters::Entity",
        from = "Column::CharacterAId",
        to = "super::characters::Column::Id"
    )]
    CharacterA,
    #[sea_orm(
        belongs_to = "super::characters::Entity",
        from = "Column::CharacterBId",
        to = "super::characters::Column::Id"
    )]
    CharacterB,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
