//! Stored files and the picture tables that reference them.
//!
//! Pictures reference stored files with `ON DELETE RESTRICT`, so the
//! database refuses to drop a file row that is still attached to a hotel or
//! room even if the in-use check is bypassed.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(STORED_FILES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS room_pictures;
             DROP TABLE IF EXISTS hotel_pictures;
             DROP TABLE IF EXISTS stored_files;",
        )
        .await?;
        Ok(())
    }
}

const STORED_FILES_SQL: &str = r"
-- Metadata of uploaded objects; the bytes live on the recorded provider
CREATE TABLE stored_files (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    owner_id UUID NOT NULL,
    original_file_name VARCHAR(255) NOT NULL,
    stored_file_name VARCHAR(255) NOT NULL,
    content_type VARCHAR(100) NOT NULL,
    size_in_bytes BIGINT NOT NULL,
    url VARCHAR(2048) NOT NULL,
    storage_provider VARCHAR(50) NOT NULL,
    blob_path VARCHAR(1024) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_stored_files_stored_file_name UNIQUE (stored_file_name),
    CONSTRAINT chk_stored_files_size CHECK (size_in_bytes >= 0),
    CONSTRAINT chk_stored_files_provider CHECK (storage_provider IN ('AzureBlob', 'LocalFile'))
);

-- Owner listing, newest first
CREATE INDEX idx_stored_files_owner ON stored_files(owner_id, created_at DESC);

CREATE TABLE hotel_pictures (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    hotel_id UUID NOT NULL,
    stored_file_id UUID NOT NULL REFERENCES stored_files(id) ON DELETE RESTRICT,
    caption VARCHAR(500),
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_hotel_pictures_hotel ON hotel_pictures(hotel_id, sort_order);
CREATE INDEX idx_hotel_pictures_file ON hotel_pictures(stored_file_id);

CREATE TABLE room_pictures (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    room_id UUID NOT NULL,
    stored_file_id UUID NOT NULL REFERENCES stored_files(id) ON DELETE RESTRICT,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_room_pictures_room ON room_pictures(room_id, sort_order);
CREATE INDEX idx_room_pictures_file ON room_pictures(stored_file_id);
";
