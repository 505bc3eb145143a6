//! `SeaORM` Entity for stored_files table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stored_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_file_name: String,
    #[sea_orm(unique)]
    pub stored_file_name: String,
    pub content_type: String,
    pub size_in_bytes: i64,
    pub url: String,
    pub storage_provider: String,
    pub blob_path: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hotel_pictures::Entity")]
    HotelPictures,
    #[sea_orm(has_many = "super::room_pictures::Entity")]
    RoomPictures,
}

impl Related<super::hotel_pictures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HotelPictures.def()
    }
}

impl Related<super::room_pictures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomPictures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
