//! `SeaORM` Entity for hotel_pictures table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "hotel_pictures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub stored_file_id: Uuid,
    pub caption: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stored_files::Entity",
        from = "Column::StoredFileId",
        to = "super::stored_files::Column::Id",
        on_delete = "Restrict"
    )]
    StoredFiles,
}

impl Related<super::stored_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoredFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
