//! Azure Blob Storage backend built on Apache OpenDAL.

use async_trait::async_trait;
use hotelstore_shared::{AzureBlobSettings, ProviderKind};
use opendal::{Operator, services};

use super::error::StorageError;
use super::object::{delete_object, read_object, write_object};
use super::provider::{StorageProvider, UploadedObject, generate_stored_file_name, join_blob_path};
use super::stream::{DownloadStream, UploadStream};

/// Object storage provider for an Azure Blob container.
///
/// Without credentials the provider has no operator and reports itself as
/// unavailable on every call instead of failing at startup.
#[derive(Debug, Clone)]
pub struct BlobStorageProvider {
    operator: Option<Operator>,
    public_root: String,
}

impl BlobStorageProvider {
    /// Build the provider from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if OpenDAL rejects the configured account.
    pub fn from_settings(settings: &AzureBlobSettings) -> Result<Self, StorageError> {
        let endpoint = settings.resolved_endpoint();
        let public_root = public_root(settings, &endpoint);

        if !settings.is_configured() {
            tracing::warn!(
                provider = %ProviderKind::AzureBlob,
                "Azure Blob Storage credentials missing, provider disabled"
            );
            return Ok(Self {
                operator: None,
                public_root,
            });
        }

        let builder = services::Azblob::default()
            .account_name(&settings.account)
            .account_key(&settings.access_key)
            .container(&settings.container)
            .endpoint(&endpoint);

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self {
            operator: Some(operator),
            public_root,
        })
    }

    /// Wrap an existing operator; object URLs are `{public_root}/{blob_path}`.
    #[must_use]
    pub fn with_operator(operator: Operator, public_root: impl Into<String>) -> Self {
        Self {
            operator: Some(operator),
            public_root: public_root.into().trim_end_matches('/').to_string(),
        }
    }

    /// Provider backed by an in-process memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory service cannot be built.
    pub fn in_memory(public_root: impl Into<String>) -> Result<Self, StorageError> {
        let operator = Operator::new(services::Memory::default())
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();
        Ok(Self::with_operator(operator, public_root))
    }

    fn operator(&self) -> Result<&Operator, StorageError> {
        self.operator
            .as_ref()
            .ok_or_else(|| StorageError::unavailable(ProviderKind::AzureBlob))
    }

    fn object_url(&self, blob_path: &str) -> String {
        format!("{}/{blob_path}", self.public_root)
    }
}

fn public_root(settings: &AzureBlobSettings, endpoint: &str) -> String {
    match &settings.base_url {
        Some(base) if !base.trim().is_empty() => base.trim_end_matches('/').to_string(),
        _ => format!("{endpoint}/{}", settings.container),
    }
}

#[async_trait]
impl StorageProvider for BlobStorageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AzureBlob
    }

    async fn is_available(&self) -> bool {
        let Some(operator) = &self.operator else {
            return false;
        };
        match operator.check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(provider = %self.kind(), error = %e, "Blob container unreachable");
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

        let written = write_object(operator, self.kind(), &blob_path, content_type, content).await?;
        tracing::debug!(provider = %self.kind(), %blob_path, bytes = written, "Blob uploaded");

        Ok(UploadedObject {
            url: self.object_url(&blob_path),
            stored_file_name,
            blob_path,
        })
    }

    async fn download(&self, blob_path: &str) -> Result<DownloadStream, StorageError> {
        read_object(self.operator()?, self.kind(), blob_path).await
    }

    async fn delete(&self, blob_path: &str) -> Result<(), StorageError> {
        delete_object(self.operator()?, self.kind(), blob_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::object::CHUNK_SIZE;
    use rstest::rstest;
    use tokio::io::AsyncReadExt;

    fn provider() -> BlobStorageProvider {
        BlobStorageProvider::in_memory("https://cdn.example.com/hotel-files/").expect("memory")
    }

    async fn read_all(mut stream: DownloadStream) -> Vec<u8> {
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.expect("read");
        out
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let provider = provider();
        let mut content = UploadStream::from_bytes(&b"\x89PNG-data"[..]);

        let uploaded = provider
            .upload(&mut content, "lobby.png", "image/png", "abc123/2026/01")
            .await
            .expect("upload");

        assert!(uploaded.blob_path.starts_with("abc123/2026/01/"));
        assert!(uploaded.blob_path.ends_with(".png"));
        assert!(uploaded.blob_path.ends_with(&uploaded.stored_file_name));
        assert_eq!(
            uploaded.url,
            format!("https://cdn.example.com/hotel-files/{}", uploaded.blob_path)
        );

        let bytes = read_all(provider.download(&uploaded.blob_path).await.expect("download")).await;
        assert_eq!(bytes, b"\x89PNG-data");
    }

    #[tokio::test]
    async fn test_large_upload_spans_chunks() {
        let provider = provider();
        let data: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        let mut content = UploadStream::from_bytes(data.clone());

        let uploaded = provider
            .upload(&mut content, "big.jpg", "image/jpeg", "o/2026/02")
            .await
            .expect("upload");

        let bytes = read_all(provider.download(&uploaded.blob_path).await.expect("download")).await;
        assert_eq!(bytes, data);
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let provider = provider();

        let err = provider.download("nope/x.png").await.err().expect("error");
        assert!(matches!(err, StorageError::NotFound { .. }));

        let err = provider.delete("nope/x.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_blob() {
        let provider = provider();
        let mut content = UploadStream::from_bytes(&b"x"[..]);
        let uploaded = provider
            .upload(&mut content, "a.gif", "image/gif", "o/2026/03")
            .await
            .expect("upload");

        provider.delete(&uploaded.blob_path).await.expect("delete");

        let err = provider.download(&uploaded.blob_path).await.err().expect("error");
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_memory_operator_is_available() {
        assert!(provider().is_available().await);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_unavailable() {
        let provider =
            BlobStorageProvider::from_settings(&AzureBlobSettings::default()).expect("build");

        assert!(!provider.is_available().await);

        let mut content = UploadStream::from_bytes(&b"x"[..]);
        let err = provider
            .upload(&mut content, "a.png", "image/png", "o")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Unavailable {
                provider: ProviderKind::AzureBlob
            }
        ));
    }

    struct Broken;

    impl tokio::io::AsyncRead for Broken {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::other("connection reset")))
        }
    }

    async fn stored_objects(provider: &BlobStorageProvider) -> Vec<String> {
        let operator = provider.operator().expect("operator");
        operator
            .list_with("")
            .recursive(true)
            .await
            .expect("list")
            .into_iter()
            .filter(|entry| entry.metadata().is_file())
            .map(|entry| entry.path().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_reader_failure_after_first_chunk_leaves_no_blob() {
        let provider = provider();
        let mut content =
            UploadStream::forward_only(tokio::io::AsyncReadExt::chain(&b"partial"[..], Broken), 64);

        let err = provider
            .upload(&mut content, "a.png", "image/png", "o/2026/01")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::UploadFailed(_)));
        assert!(stored_objects(&provider).await.is_empty());
    }

    #[rstest]
    #[case::longer_than_declared(vec![1u8; 4096], 1)]
    #[case::shorter_than_declared(vec![1u8; 10], 4096)]
    #[tokio::test]
    async fn test_length_mismatch_is_rejected(#[case] data: Vec<u8>, #[case] declared: u64) {
        let provider = provider();
        let mut content = UploadStream::seekable(std::io::Cursor::new(data), declared);

        let err = provider
            .upload(&mut content, "a.png", "image/png", "o/2026/01")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::UploadFailed(ref msg) if msg.contains("declared")));
        assert!(stored_objects(&provider).await.is_empty());
    }

    #[test]
    fn test_public_root_prefers_base_url() {
        let mut settings = AzureBlobSettings {
            account: "acct".to_string(),
            ..AzureBlobSettings::default()
        };
        assert_eq!(
            public_root(&settings, &settings.resolved_endpoint()),
            "https://acct.blob.core.windows.net/hotel-files"
        );

        settings.base_url = Some("https://cdn.example.com/".to_string());
        assert_eq!(
            public_root(&settings, &settings.resolved_endpoint()),
            "https://cdn.example.com"
        );
    }
}
