//! Persistence contract for stored file metadata.

use hotelstore_shared::{StoredFileId, UserId};

use super::error::FileError;
use super::types::StoredFile;

/// Repository trait for stored file persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait StoredFileRepository: Send + Sync {
    /// Find a stored file by ID.
    fn get_by_id(
        &self,
        id: StoredFileId,
    ) -> impl std::future::Future<Output = Result<Option<StoredFile>, FileError>> + Send;

    /// List an owner's files, newest first.
    fn get_by_owner_id(
        &self,
        owner_id: UserId,
    ) -> impl std::future::Future<Output = Result<Vec<StoredFile>, FileError>> + Send;

    /// Check if a stored file exists.
    fn exists(
        &self,
        id: StoredFileId,
    ) -> impl std::future::Future<Output = Result<bool, FileError>> + Send;

    /// Persist a new record.
    fn add(
        &self,
        file: &StoredFile,
    ) -> impl std::future::Future<Output = Result<(), FileError>> + Send;

    /// Delete a record. Returns whether a row was removed.
    fn delete(
        &self,
        id: StoredFileId,
    ) -> impl std::future::Future<Output = Result<bool, FileError>> + Send;

    /// Whether any hotel or room picture still references the file.
    fn is_in_use(
        &self,
        id: StoredFileId,
    ) -> impl std::future::Future<Output = Result<bool, FileError>> + Send;
}
