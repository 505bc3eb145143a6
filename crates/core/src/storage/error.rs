//! Storage error types.

use hotelstore_shared::ProviderKind;
use thiserror::Error;

/// Errors reported by a single storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Nothing stored under the given path.
    #[error("file not found: {path}")]
    NotFound {
        /// Backend path that was not found.
        path: String,
    },

    /// Backend is unreachable or not configured.
    #[error("storage provider '{provider}' is not available")]
    Unavailable {
        /// The backend that is unavailable.
        provider: ProviderKind,
    },

    /// Writing bytes failed.
    #[error("failed to upload file: {0}")]
    UploadFailed(String),

    /// Reading bytes failed.
    #[error("failed to download file: {0}")]
    DownloadFailed(String),

    /// Removing bytes failed.
    #[error("failed to delete file: {0}")]
    DeleteFailed(String),

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(provider: ProviderKind) -> Self {
        Self::Unavailable { provider }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Storage.FileNotFound",
            Self::Unavailable { .. } => "Storage.ProviderUnavailable",
            Self::UploadFailed(_) => "Storage.UploadFailed",
            Self::DownloadFailed(_) => "Storage.DownloadFailed",
            Self::DeleteFailed(_) => "Storage.DeleteFailed",
            Self::Configuration(_) => "Storage.Configuration",
        }
    }

    /// Classify an OpenDAL error raised while working on `path`.
    ///
    /// `NotFound` keeps its meaning; everything else becomes the failure
    /// variant produced by `failed`.
    pub(crate) fn from_opendal(
        err: &opendal::Error,
        path: &str,
        failed: fn(String) -> Self,
    ) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::not_found(path),
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(StorageError::not_found("a/b").code(), "Storage.FileNotFound");
        assert_eq!(
            StorageError::unavailable(ProviderKind::AzureBlob).code(),
            "Storage.ProviderUnavailable"
        );
        assert_eq!(
            StorageError::UploadFailed(String::new()).code(),
            "Storage.UploadFailed"
        );
        assert_eq!(
            StorageError::DownloadFailed(String::new()).code(),
            "Storage.DownloadFailed"
        );
        assert_eq!(
            StorageError::DeleteFailed(String::new()).code(),
            "Storage.DeleteFailed"
        );
    }

    #[test]
    fn test_display_names_provider() {
        let err = StorageError::unavailable(ProviderKind::LocalFile);
        assert_eq!(
            err.to_string(),
            "storage provider 'LocalFile' is not available"
        );
    }

    #[test]
    fn test_from_opendal_maps_kinds() {
        let missing = opendal::Error::new(opendal::ErrorKind::NotFound, "missing");
        let err = StorageError::from_opendal(&missing, "k", StorageError::UploadFailed);
        assert!(matches!(err, StorageError::NotFound { .. }));

        let other = opendal::Error::new(opendal::ErrorKind::Unexpected, "boom");
        let err = StorageError::from_opendal(&other, "k", StorageError::UploadFailed);
        assert!(matches!(err, StorageError::UploadFailed(_)));
    }
}
