//! File service error types.

use hotelstore_shared::{AppError, StoredFileId};
use serde::Serialize;
use thiserror::Error;

use crate::storage::{StorageError, ValidationError};

/// File service errors.
#[derive(Debug, Error)]
pub enum FileError {
    /// The upload violated one or more rules.
    #[error("file validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// The named backend is not available.
    #[error("Storage provider '{0}' is not available.")]
    ProviderUnavailable(String),

    /// Neither the primary nor the fallback backend is available.
    #[error("All storage providers are unavailable.")]
    AllProvidersUnavailable,

    /// Writing the bytes failed.
    #[error("Failed to upload file: {0}")]
    UploadFailed(String),

    /// Reading the bytes failed.
    #[error("Failed to download file: {0}")]
    DownloadFailed(String),

    /// Removing the bytes failed.
    #[error("Failed to delete file: {0}")]
    DeleteFailed(String),

    /// No stored file with the requested id or path.
    #[error("The requested file was not found.")]
    FileNotFound,

    /// The file is still referenced by a hotel or room picture.
    #[error("Cannot delete file {0} because it is still in use.")]
    FileInUse(StoredFileId),

    /// Storage configuration is invalid.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Metadata persistence failed.
    #[error("repository error: {0}")]
    Repository(String),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

/// One reportable problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub description: String,
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl FileError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Storage.Validation",
            Self::ProviderUnavailable(_) => "Storage.ProviderUnavailable",
            Self::AllProvidersUnavailable => "Storage.AllProvidersUnavailable",
            Self::UploadFailed(_) => "Storage.UploadFailed",
            Self::DownloadFailed(_) => "Storage.DownloadFailed",
            Self::DeleteFailed(_) => "Storage.DeleteFailed",
            Self::FileNotFound => "Storage.FileNotFound",
            Self::FileInUse(_) => "Storage.FileInUse",
            Self::Configuration(_) => "Storage.Configuration",
            Self::Repository(_) => "Storage.Repository",
            Self::Cancelled => "Storage.Cancelled",
        }
    }

    /// One detail per problem; validation failures list every violated rule.
    #[must_use]
    pub fn details(&self) -> Vec<ErrorDetail> {
        match self {
            Self::Validation(errors) => errors
                .iter()
                .map(|e| ErrorDetail {
                    code: e.code().to_string(),
                    description: e.to_string(),
                })
                .collect(),
            other => vec![ErrorDetail {
                code: other.code().to_string(),
                description: other.to_string(),
            }],
        }
    }
}

impl From<StorageError> for FileError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::FileNotFound,
            StorageError::Unavailable { provider } => Self::ProviderUnavailable(provider.to_string()),
            StorageError::UploadFailed(msg) => Self::UploadFailed(msg),
            StorageError::DownloadFailed(msg) => Self::DownloadFailed(msg),
            StorageError::DeleteFailed(msg) => Self::DeleteFailed(msg),
            StorageError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        let message = err.to_string();
        match err {
            FileError::Validation(_) => Self::Validation(message),
            FileError::FileNotFound => Self::NotFound(message),
            FileError::FileInUse(_) => Self::Conflict(message),
            FileError::Repository(_) => Self::Database(message),
            FileError::Configuration(_) | FileError::Cancelled => Self::Internal(message),
            FileError::ProviderUnavailable(_)
            | FileError::AllProvidersUnavailable
            | FileError::UploadFailed(_)
            | FileError::DownloadFailed(_)
            | FileError::DeleteFailed(_) => Self::ExternalService(message),
        }
    }
}
