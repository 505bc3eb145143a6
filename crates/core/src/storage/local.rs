//! Local filesystem backend built on the OpenDAL `Fs` service.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use hotelstore_shared::{LocalStorageSettings, ProviderKind};
use opendal::{Operator, services};
use uuid::Uuid;

use super::error::StorageError;
use super::object::{delete_object, read_object, write_object};
use super::provider::{StorageProvider, UploadedObject, generate_stored_file_name, join_blob_path};
use super::stream::{DownloadStream, UploadStream};

/// Directory under the root that holds in-flight writes.
const PARTIAL_DIR: &str = ".partial";

/// Stores files under a root directory.
///
/// Objects land at `root/containerPath/storedName`. Writes go to a temp file
/// under `root/.partial` and are renamed into place once synced.
#[derive(Debug, Clone)]
pub struct LocalFileStorageProvider {
    operator: Option<Operator>,
    root: PathBuf,
    base_url: String,
}

impl LocalFileStorageProvider {
    /// Build the provider from settings, resolving relative roots against
    /// the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn from_settings(settings: &LocalStorageSettings) -> Result<Self, StorageError> {
        let base = Path::new(&settings.base_path);
        let root = if base.is_absolute() {
            base.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .join(base)
        };

        Ok(Self::with_root(root, &settings.base_url))
    }

    /// Provider rooted at `root`, serving files under `base_url`.
    ///
    /// A root that cannot be prepared leaves the provider unavailable.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>, base_url: &str) -> Self {
        let root = root.into();
        let operator = match create_operator(&root) {
            Ok(operator) => Some(operator),
            Err(e) => {
                tracing::warn!(
                    provider = %ProviderKind::LocalFile,
                    root = %root.display(),
                    error = %e,
                    "Could not prepare storage root, provider disabled"
                );
                None
            }
        };

        Self {
            operator,
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn operator(&self) -> Result<&Operator, StorageError> {
        self.operator
            .as_ref()
            .ok_or_else(|| StorageError::unavailable(ProviderKind::LocalFile))
    }
}

fn create_operator(root: &Path) -> Result<Operator, StorageError> {
    let root_str = root
        .to_str()
        .ok_or_else(|| StorageError::configuration("storage root is not valid UTF-8"))?;
    let partial_dir = root.join(PARTIAL_DIR);
    let partial_str = partial_dir
        .to_str()
        .ok_or_else(|| StorageError::configuration("storage root is not valid UTF-8"))?;

    let builder = services::Fs::default()
        .root(root_str)
        .atomic_write_dir(partial_str);

    Ok(Operator::new(builder)
        .map_err(|e| StorageError::configuration(e.to_string()))?
        .finish())
}

/// Accept only plain relative segments that are not hidden.
fn check_blob_path(blob_path: &str) -> Result<(), StorageError> {
    let mut components = Path::new(blob_path).components().peekable();
    let valid = components.peek().is_some()
        && components.all(|c| match c {
            Component::Normal(segment) => !segment.to_string_lossy().starts_with('.'),
            _ => false,
        });

    if valid {
        Ok(())
    } else {
        Err(StorageError::not_found(blob_path))
    }
}

#[async_trait]
impl StorageProvider for LocalFileStorageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LocalFile
    }

    async fn is_available(&self) -> bool {
        let Some(operator) = &self.operator else {
            return false;
        };
        let probe = format!(".write_test-{}", &Uuid::new_v4().simple().to_string()[..8]);

        let result = async {
            operator.write(&probe, &b"probe"[..]).await?;
            operator.delete(&probe).await
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    provider = %self.kind(),
                    root = %self.root.display(),
                    error = %e,
                    "Storage root is not writable"
                );
                false
            }
        }
    }

    async fn upload(
        &self,
        content: &mut UploadStream,
        file_name: &str,
        content_type: &str,
        container_path: &str,
    ) -> Result<UploadedObject, StorageError> {
        let operator = self.operator()?;
        let stored_file_name = generate_stored_file_name(file_name);
        let blob_path = join_blob_path(container_path, &stored_file_name);
        check_blob_path(&blob_path).map_err(|_| {
            StorageError::UploadFailed(format!("invalid container path '{container_path}'"))
        })?;

        let written = write_object(operator, self.kind(), &blob_path, content_type, content).await?;
        tracing::debug!(provider = %self.kind(), %blob_path, bytes = written, "File written");

        Ok(UploadedObject {
            url: format!("{}/{blob_path}", self.base_url),
            stored_file_name,
            blob_path,
        })
    }

    async fn download(&self, blob_path: &str) -> Result<DownloadStream, StorageError> {
        check_blob_path(blob_path)?;
        read_object(self.operator()?, self.kind(), blob_path).await
    }

    async fn delete(&self, blob_path: &str) -> Result<(), StorageError> {
        check_blob_path(blob_path)?;
        delete_object(self.operator()?, self.kind(), blob_path).await
    }
}
