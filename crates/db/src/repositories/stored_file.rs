//! Stored file repository for database operations.
//!
//! Implements stored file persistence and the in-use check using SeaORM.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{hotel_pictures, room_pictures, stored_files};
use hotelstore_core::files::{FileError, StoredFile, StoredFileRepository as StoredFileRepoTrait};
use hotelstore_shared::{ProviderKind, StoredFileId, UserId};

/// Stored file repository implementation.
#[derive(Debug, Clone)]
pub struct StoredFileRepository {
    db: DatabaseConnection,
}

impl StoredFileRepository {
    /// Create a new stored file repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl StoredFileRepoTrait for StoredFileRepository {
    async fn get_by_id(&self, id: StoredFileId) -> Result<Option<StoredFile>, FileError> {
        let model = stored_files::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(repository_error)?;

        model.map(to_domain).transpose()
    }

    async fn get_by_owner_id(&self, owner_id: UserId) -> Result<Vec<StoredFile>, FileError> {
        let models = stored_files::Entity::find()
            .filter(stored_files::Column::OwnerId.eq(owner_id.into_inner()))
            .order_by_desc(stored_files::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(repository_error)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn exists(&self, id: StoredFileId) -> Result<bool, FileError> {
        let count = stored_files::Entity::find_by_id(id.into_inner())
            .count(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(count > 0)
    }

    async fn add(&self, file: &StoredFile) -> Result<(), FileError> {
        let size_in_bytes = i64::try_from(file.size_in_bytes)
            .map_err(|_| FileError::repository("file size exceeds BIGINT range"))?;

        let active_model = stored_files::ActiveModel {
            id: Set(file.id.into_inner()),
            owner_id: Set(file.owner_id.into_inner()),
            original_file_name: Set(file.original_file_name.clone()),
            stored_file_name: Set(file.stored_file_name.clone()),
            content_type: Set(file.content_type.clone()),
            size_in_bytes: Set(size_in_bytes),
            url: Set(file.url.clone()),
            storage_provider: Set(file.storage_provider.as_str().to_string()),
            blob_path: Set(file.blob_path.clone()),
            created_at: Set(file.created_at.into()),
        };

        active_model
            .insert(&self.db)
            .await
            .map_err(repository_error)?;

        tracing::debug!(stored_file_id = %file.id, "Stored file row inserted");
        Ok(())
    }

    async fn delete(&self, id: StoredFileId) -> Result<bool, FileError> {
        let result = stored_files::Entity::delete_many()
            .filter(stored_files::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn is_in_use(&self, id: StoredFileId) -> Result<bool, FileError> {
        let hotel_refs = hotel_pictures::Entity::find()
            .filter(hotel_pictures::Column::StoredFileId.eq(id.into_inner()))
            .count(&self.db)
            .await
            .map_err(repository_error)?;

        if hotel_refs > 0 {
            return Ok(true);
        }

        let room_refs = room_pictures::Entity::find()
            .filter(room_pictures::Column::StoredFileId.eq(id.into_inner()))
            .count(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(room_refs > 0)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn repository_error(e: DbErr) -> FileError {
    tracing::error!(error = %e, "Stored file query failed");
    FileError::repository(e.to_string())
}

/// Convert database model to domain model.
fn to_domain(model: stored_files::Model) -> Result<StoredFile, FileError> {
    let size_in_bytes = u64::try_from(model.size_in_bytes)
        .map_err(|_| FileError::repository(format!("negative size for file {}", model.id)))?;
    let storage_provider = model
        .storage_provider
        .parse::<ProviderKind>()
        .map_err(|e| FileError::repository(format!("file {}: {e}", model.id)))?;

    Ok(StoredFile {
        id: StoredFileId::from_uuid(model.id),
        owner_id: UserId::from_uuid(model.owner_id),
        original_file_name: model.original_file_name,
        stored_file_name: model.stored_file_name,
        content_type: model.content_type,
        size_in_bytes,
        url: model.url,
        storage_provider,
        blob_path: model.blob_path,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    })
}

#[cfg(test)]
#[path = "stored_file_tests.rs"]
mod tests;
