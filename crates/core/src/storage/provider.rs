//! The backend contract shared by every storage provider.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use hotelstore_shared::{ProviderKind, StorageSettings};
use uuid::Uuid;

use super::blob::BlobStorageProvider;
use super::error::StorageError;
use super::local::LocalFileStorageProvider;
use super::stream::{DownloadStream, UploadStream};
use super::validator::file_extension;

/// Where a provider put an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    /// Locator returned by the backend (absolute or relative).
    pub url: String,
    /// Generated, collision-resistant name of the object.
    pub stored_file_name: String,
    /// Backend-internal key, `containerPath/storedFileName`.
    pub blob_path: String,
}

/// Raw byte transfer to and from one named backend.
///
/// Missing paths are reported as [`StorageError::NotFound`], never as a
/// generic failure. Implementations must not leave partial objects behind
/// when an upload fails.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> ProviderKind;

    /// Canonical name recorded on stored files.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Cheap health probe. Never errors; an unreachable backend is `false`.
    async fn is_available(&self) -> bool;

    /// Write `content` under `container_path` with a freshly generated name.
    async fn upload(
        &self,
        content: &mut UploadStream,
        file_name: &str,
        content_type: &str,
        container_path: &str,
    ) -> Result<UploadedObject, StorageError>;

    /// Open the bytes stored at `blob_path`.
    async fn download(&self, blob_path: &str) -> Result<DownloadStream, StorageError>;

    /// Remove the bytes stored at `blob_path`.
    async fn delete(&self, blob_path: &str) -> Result<(), StorageError>;
}

/// Build both backends from settings.
///
/// An unconfigured Azure account still yields a provider; it reports itself
/// as unavailable.
///
/// # Errors
///
/// Returns an error if a configured backend cannot be initialized.
pub fn build_providers(
    settings: &StorageSettings,
) -> Result<Vec<Arc<dyn StorageProvider>>, StorageError> {
    let blob = BlobStorageProvider::from_settings(&settings.azure_blob)?;
    let local = LocalFileStorageProvider::from_settings(&settings.local_storage)?;
    Ok(vec![Arc::new(blob), Arc::new(local)])
}

/// Generate `yyyyMMddHHmmss_<8 hex><ext>` for an original file name.
#[must_use]
pub fn generate_stored_file_name(original_file_name: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let random = Uuid::new_v4().simple().to_string();
    let extension = sanitize_filename(file_extension(original_file_name));
    format!("{timestamp}_{}{extension}", &random[..8])
}

/// Join a container path and a stored name into a blob path.
#[must_use]
pub fn join_blob_path(container_path: &str, stored_file_name: &str) -> String {
    let container_path = container_path.trim_matches('/');
    if container_path.is_empty() {
        stored_file_name.to_string()
    } else {
        format!("{container_path}/{stored_file_name}")
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.png", "photo.png")]
    #[case("my pool (1).jpg", "my_pool__1_.jpg")]
    #[case("lobby@#$.webp", "lobby___.webp")]
    #[case("日本語.png", "___.png")]
    fn test_sanitize_filename(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(input), expected);
    }

    #[test]
    fn test_stored_file_name_shape() {
        let name = generate_stored_file_name("Photo Of Lobby.PNG");
        let (stamp, rest) = name.split_once('_').expect("underscore separator");

        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest.len(), 8 + ".PNG".len());
        assert!(rest[..8].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(rest.ends_with(".PNG"));
    }

    #[test]
    fn test_stored_file_name_without_extension() {
        let name = generate_stored_file_name("README");
        assert_eq!(name.len(), 14 + 1 + 8);
    }

    #[test]
    fn test_stored_file_names_differ() {
        let a = generate_stored_file_name("a.png");
        let b = generate_stored_file_name("a.png");
        assert_ne!(a, b);
    }

    #[rstest]
    #[case("owner/2026/01", "x.png", "owner/2026/01/x.png")]
    #[case("/owner/2026/01/", "x.png", "owner/2026/01/x.png")]
    #[case("", "x.png", "x.png")]
    fn test_join_blob_path(#[case] container: &str, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(join_blob_path(container, name), expected);
    }
}
