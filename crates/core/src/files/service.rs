//! File storage service: validation, provider failover and metadata.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use hotelstore_shared::{ProviderKind, StorageSettings, StoredFileId, UserId};
use tokio_util::sync::CancellationToken;

use super::error::FileError;
use super::repository::StoredFileRepository;
use super::types::{FileDownload, StoredFile, UploadFileInput};
use crate::storage::{
    DownloadStream, FileValidator, StorageError, StorageProvider, UploadStream, UploadedObject,
    build_providers,
};

/// Orchestrates uploads, downloads and deletes across storage providers.
///
/// The primary and fallback providers are fixed at construction. Reads and
/// deletes use the provider recorded on each file, so files written before a
/// change of primary stay reachable.
pub struct FileStorageService<R: StoredFileRepository> {
    providers: HashMap<ProviderKind, Arc<dyn StorageProvider>>,
    primary: Arc<dyn StorageProvider>,
    fallback: Option<Arc<dyn StorageProvider>>,
    enable_fallback: bool,
    validator: FileValidator,
    repo: Arc<R>,
}

impl<R: StoredFileRepository> FileStorageService<R> {
    /// Create a service over an explicit provider set.
    ///
    /// The configured primary must be present. The fallback is the other
    /// backend kind; without it the service runs with the primary only.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the primary provider is missing.
    pub fn new(
        providers: Vec<Arc<dyn StorageProvider>>,
        repo: Arc<R>,
        settings: &StorageSettings,
    ) -> Result<Self, FileError> {
        let providers: HashMap<_, _> = providers.into_iter().map(|p| (p.kind(), p)).collect();

        let primary_kind = settings.primary_provider;
        let primary = providers.get(&primary_kind).cloned().ok_or_else(|| {
            FileError::Configuration(format!(
                "primary storage provider '{primary_kind}' is not registered"
            ))
        })?;

        let fallback = providers.get(&primary_kind.counterpart()).cloned();
        if fallback.is_none() && settings.enable_fallback {
            tracing::warn!(
                primary = %primary_kind,
                fallback = %primary_kind.counterpart(),
                "Fallback provider not registered, uploads will not fail over"
            );
        }

        Ok(Self {
            providers,
            primary,
            fallback,
            enable_fallback: settings.enable_fallback,
            validator: FileValidator::new(settings.validation.clone()),
            repo,
        })
    }

    /// Create a service with both backends built from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend cannot be initialized.
    pub fn from_settings(settings: &StorageSettings, repo: Arc<R>) -> Result<Self, FileError> {
        let providers = build_providers(settings)?;
        Self::new(providers, repo, settings)
    }

    /// Backend tried first on upload.
    #[must_use]
    pub fn primary_provider(&self) -> ProviderKind {
        self.primary.kind()
    }

    /// Backend tried when the primary fails, if fallback is enabled.
    #[must_use]
    pub fn fallback_provider(&self) -> Option<ProviderKind> {
        self.fallback
            .as_ref()
            .filter(|_| self.enable_fallback)
            .map(|p| p.kind())
    }

    /// Validate, store the bytes and persist the metadata.
    ///
    /// Validation failures are returned before any I/O. A failed primary is
    /// retried once on the fallback when fallback is enabled and the stream
    /// can be rewound.
    ///
    /// # Errors
    ///
    /// Returns validation, provider, repository or cancellation errors. No
    /// metadata is persisted on error.
    pub async fn upload(
        &self,
        input: UploadFileInput,
        cancel: &CancellationToken,
    ) -> Result<StoredFile, FileError> {
        let UploadFileInput {
            owner_id,
            file_name,
            content_type,
            mut content,
        } = input;
        let size = content.len();

        self.validator
            .validate(&file_name, &content_type, size)
            .map_err(FileError::Validation)?;

        let container_path = container_path(owner_id, Utc::now());
        let (provider, uploaded) = self
            .upload_with_failover(
                &mut content,
                &file_name,
                &content_type,
                &container_path,
                cancel,
            )
            .await?;

        if cancel.is_cancelled() {
            self.discard(provider.as_ref(), &uploaded.blob_path).await;
            return Err(FileError::Cancelled);
        }

        let file = StoredFile::create(
            owner_id,
            file_name,
            content_type,
            size,
            provider.kind(),
            uploaded,
        );

        if let Err(e) = self.repo.add(&file).await {
            tracing::error!(stored_file_id = %file.id, error = %e, "Failed to persist stored file");
            self.discard(provider.as_ref(), &file.blob_path).await;
            return Err(e);
        }

        tracing::info!(
            stored_file_id = %file.id,
            owner_id = %file.owner_id,
            provider = %file.storage_provider,
            size_in_bytes = file.size_in_bytes,
            "File uploaded"
        );

        Ok(file)
    }

    async fn upload_with_failover(
        &self,
        content: &mut UploadStream,
        file_name: &str,
        content_type: &str,
        container_path: &str,
        cancel: &CancellationToken,
    ) -> Result<(Arc<dyn StorageProvider>, UploadedObject), FileError> {
        let primary_err = match self
            .try_upload(&self.primary, content, file_name, content_type, container_path, cancel)
            .await
        {
            Ok(uploaded) => return Ok((Arc::clone(&self.primary), uploaded)),
            Err(FileError::Cancelled) => return Err(FileError::Cancelled),
            Err(e) => e,
        };

        let Some(fallback) = self.fallback.as_ref().filter(|_| self.enable_fallback) else {
            return Err(primary_err);
        };

        if let Err(e) = content.rewind().await {
            tracing::warn!(
                primary = %self.primary.kind(),
                error = %e,
                "Upload stream cannot be rewound, skipping fallback"
            );
            return Err(primary_err);
        }

        tracing::warn!(
            primary = %self.primary.kind(),
            fallback = %fallback.kind(),
            error = %primary_err,
            "Primary storage provider failed, falling back"
        );

        match self
            .try_upload(fallback, content, file_name, content_type, container_path, cancel)
            .await
        {
            Ok(uploaded) => Ok((Arc::clone(fallback), uploaded)),
            Err(FileError::ProviderUnavailable(_))
                if matches!(primary_err, FileError::ProviderUnavailable(_)) =>
            {
                Err(FileError::AllProvidersUnavailable)
            }
            Err(e) => Err(e),
        }
    }

    async fn try_upload(
        &self,
        provider: &Arc<dyn StorageProvider>,
        content: &mut UploadStream,
        file_name: &str,
        content_type: &str,
        container_path: &str,
        cancel: &CancellationToken,
    ) -> Result<UploadedObject, FileError> {
        if !cancellable(cancel, provider.is_available()).await? {
            tracing::warn!(provider = %provider.kind(), "Storage provider unavailable");
            return Err(FileError::ProviderUnavailable(provider.name().to_string()));
        }

        let uploaded = cancellable(
            cancel,
            provider.upload(content, file_name, content_type, container_path),
        )
        .await??;
        Ok(uploaded)
    }

    /// Remove bytes that will not be referenced by any record.
    async fn discard(&self, provider: &dyn StorageProvider, blob_path: &str) {
        if let Err(e) = provider.delete(blob_path).await {
            tracing::warn!(
                provider = %provider.kind(),
                %blob_path,
                error = %e,
                "Failed to remove orphaned upload"
            );
        }
    }

    /// Open the bytes of a stored file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` for unknown ids or missing bytes, and
    /// `ProviderUnavailable` when the recorded provider is not registered.
    pub async fn download(
        &self,
        id: StoredFileId,
        cancel: &CancellationToken,
    ) -> Result<DownloadStream, FileError> {
        let file = self.get_by_id(id).await?;
        self.open(&file, cancel).await
    }

    /// Open a stored file together with what is needed to serve it.
    ///
    /// # Errors
    ///
    /// Same as [`FileStorageService::download`].
    pub async fn open_file(
        &self,
        id: StoredFileId,
        cancel: &CancellationToken,
    ) -> Result<FileDownload, FileError> {
        let file = self.get_by_id(id).await?;
        let content = self.open(&file, cancel).await?;
        Ok(FileDownload {
            content,
            content_type: file.content_type,
            file_name: file.original_file_name,
        })
    }

    async fn open(
        &self,
        file: &StoredFile,
        cancel: &CancellationToken,
    ) -> Result<DownloadStream, FileError> {
        let provider = self.resolve_provider(file.storage_provider)?;
        let content = cancellable(cancel, provider.download(&file.blob_path)).await??;
        Ok(content)
    }

    /// Delete a stored file that is no longer referenced.
    ///
    /// The metadata row goes first, so a failed delete never leaves a record
    /// pointing at missing bytes. Failing to remove the bytes afterwards is
    /// logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` for unknown ids and `FileInUse` when a hotel or
    /// room picture still references the file, in which case nothing changes.
    /// A repository failure also leaves the bytes in place.
    pub async fn delete(
        &self,
        id: StoredFileId,
        cancel: &CancellationToken,
    ) -> Result<(), FileError> {
        let file = self.get_by_id(id).await?;

        if self.repo.is_in_use(id).await? {
            tracing::info!(stored_file_id = %id, "Refusing to delete file still in use");
            return Err(FileError::FileInUse(id));
        }

        if cancel.is_cancelled() {
            return Err(FileError::Cancelled);
        }

        if !self.repo.delete(id).await? {
            return Err(FileError::FileNotFound);
        }

        match self.resolve_provider(file.storage_provider) {
            Ok(provider) => match provider.delete(&file.blob_path).await {
                Ok(()) => {}
                Err(StorageError::NotFound { .. }) => {
                    tracing::warn!(
                        stored_file_id = %id,
                        provider = %file.storage_provider,
                        "Stored bytes already missing"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        stored_file_id = %id,
                        provider = %file.storage_provider,
                        blob_path = %file.blob_path,
                        error = %e,
                        "Failed to delete stored bytes, leaving an orphaned object"
                    );
                }
            },
            Err(e) => {
                tracing::warn!(stored_file_id = %id, error = %e, "Cannot reach provider for delete");
            }
        }

        tracing::info!(stored_file_id = %id, "File deleted");
        Ok(())
    }

    /// Files uploaded by an owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn get_by_owner(&self, owner_id: UserId) -> Result<Vec<StoredFile>, FileError> {
        self.repo.get_by_owner_id(owner_id).await
    }

    /// Metadata of one stored file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` for unknown ids.
    pub async fn get_by_id(&self, id: StoredFileId) -> Result<StoredFile, FileError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(FileError::FileNotFound)
    }

    fn resolve_provider(&self, kind: ProviderKind) -> Result<&Arc<dyn StorageProvider>, FileError> {
        self.providers
            .get(&kind)
            .ok_or_else(|| FileError::ProviderUnavailable(kind.to_string()))
    }
}

/// `{owner id without dashes}/{year}/{month:02}` in UTC.
fn container_path(owner_id: UserId, now: DateTime<Utc>) -> String {
    format!(
        "{}/{:04}/{:02}",
        owner_id.into_inner().simple(),
        now.year(),
        now.month()
    )
}

/// Race `fut` against cancellation.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Result<T, FileError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(FileError::Cancelled),
        out = fut => Ok(out),
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
