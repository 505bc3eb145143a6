//! Public access URLs for stored files.

use hotelstore_shared::StoredFileId;

/// Builds the stable URL clients use to fetch a stored file.
///
/// Independent of the provider locator recorded on the file, so a file keeps
/// its address when its bytes move.
pub trait FileUrlResolver: Send + Sync {
    /// URL for the given file.
    fn access_url(&self, id: StoredFileId) -> String;
}

/// Serves files through the API at `{public_base_url}/api/files/{id}`.
#[derive(Debug, Clone)]
pub struct ApiFileUrlResolver {
    public_base_url: String,
}

impl ApiFileUrlResolver {
    /// Create a resolver for the given scheme and host, e.g. `https://hotels.example.com`.
    #[must_use]
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl FileUrlResolver for ApiFileUrlResolver {
    fn access_url(&self, id: StoredFileId) -> String {
        format!("{}/api/files/{id}", self.public_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{FileSummary, StoredFile};
    use crate::storage::UploadedObject;
    use hotelstore_shared::{ProviderKind, UserId};

    #[test]
    fn test_api_url() {
        let resolver = ApiFileUrlResolver::new("https://hotels.example.com/");
        let id = StoredFileId::new();
        assert_eq!(
            resolver.access_url(id),
            format!("https://hotels.example.com/api/files/{id}")
        );
    }

    #[test]
    fn test_summary_uses_resolver_not_provider_url() {
        let file = StoredFile::create(
            UserId::new(),
            "lobby.png",
            "image/png",
            2048,
            ProviderKind::LocalFile,
            UploadedObject {
                url: "/files/o/2026/01/x.png".to_string(),
                stored_file_name: "x.png".to_string(),
                blob_path: "o/2026/01/x.png".to_string(),
            },
        );
        let resolver = ApiFileUrlResolver::new("http://localhost:8080");

        let summary = FileSummary::new(&file, &resolver);

        assert_eq!(summary.id, file.id);
        assert_eq!(summary.file_name, "lobby.png");
        assert_eq!(summary.url, format!("http://localhost:8080/api/files/{}", file.id));
        assert_eq!(summary.size_in_bytes, 2048);
        assert_eq!(summary.uploaded_at, file.created_at);
    }
}
