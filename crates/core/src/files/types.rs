//! Stored file domain types.

use chrono::{DateTime, Utc};
use hotelstore_shared::{ProviderKind, StoredFileId, UserId};
use serde::{Deserialize, Serialize};

use super::url::FileUrlResolver;
use crate::storage::{DownloadStream, UploadStream, UploadedObject};

/// Metadata of an uploaded object.
///
/// `storage_provider` and `blob_path` always name the backend and location
/// that hold the bytes; reads and deletes go there, not to the current
/// primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Stored file ID.
    pub id: StoredFileId,
    /// Uploading user.
    pub owner_id: UserId,
    /// Name supplied by the uploader.
    pub original_file_name: String,
    /// Generated name of the object.
    pub stored_file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size_in_bytes: u64,
    /// Locator returned by the backend.
    pub url: String,
    /// Backend holding the bytes.
    pub storage_provider: ProviderKind,
    /// Backend-internal path.
    pub blob_path: String,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    /// Build the record for bytes a provider has just written.
    #[must_use]
    pub fn create(
        owner_id: UserId,
        original_file_name: impl Into<String>,
        content_type: impl Into<String>,
        size_in_bytes: u64,
        storage_provider: ProviderKind,
        uploaded: UploadedObject,
    ) -> Self {
        Self {
            id: StoredFileId::new(),
            owner_id,
            original_file_name: original_file_name.into(),
            stored_file_name: uploaded.stored_file_name,
            content_type: content_type.into(),
            size_in_bytes,
            url: uploaded.url,
            storage_provider,
            blob_path: uploaded.blob_path,
            created_at: Utc::now(),
        }
    }
}

/// Input for an upload.
#[derive(Debug)]
pub struct UploadFileInput {
    /// Uploading user.
    pub owner_id: UserId,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// File content; its declared length is validated.
    pub content: UploadStream,
}

/// A stored file opened for serving.
pub struct FileDownload {
    /// Readable bytes.
    pub content: DownloadStream,
    /// MIME type recorded at upload.
    pub content_type: String,
    /// Original file name.
    pub file_name: String,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload")
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// What the presentation layer returns for a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// Stored file ID.
    pub id: StoredFileId,
    /// Original file name.
    pub file_name: String,
    /// Public access URL.
    pub url: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size_in_bytes: u64,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl FileSummary {
    /// Summarize a record, addressing it through `resolver`.
    #[must_use]
    pub fn new(file: &StoredFile, resolver: &dyn FileUrlResolver) -> Self {
        Self {
            id: file.id,
            file_name: file.original_file_name.clone(),
            url: resolver.access_url(file.id),
            content_type: file.content_type.clone(),
            size_in_bytes: file.size_in_bytes,
            uploaded_at: file.created_at,
        }
    }
}
