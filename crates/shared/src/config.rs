//! Application configuration management.

use serde::Deserialize;

use crate::types::ProviderKind;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend tried first on upload.
    #[serde(default = "default_primary_provider")]
    pub primary_provider: ProviderKind,
    /// Retry a failed upload on the other backend.
    #[serde(default = "default_enable_fallback")]
    pub enable_fallback: bool,
    /// Azure Blob Storage settings.
    #[serde(default)]
    pub azure_blob: AzureBlobSettings,
    /// Local filesystem settings.
    #[serde(default)]
    pub local_storage: LocalStorageSettings,
    /// Upload validation policy.
    #[serde(default)]
    pub validation: FileValidationSettings,
}

fn default_primary_provider() -> ProviderKind {
    ProviderKind::AzureBlob
}

fn default_enable_fallback() -> bool {
    true
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            primary_provider: default_primary_provider(),
            enable_fallback: default_enable_fallback(),
            azure_blob: AzureBlobSettings::default(),
            local_storage: LocalStorageSettings::default(),
            validation: FileValidationSettings::default(),
        }
    }
}

impl StorageSettings {
    /// Set the primary provider.
    #[must_use]
    pub fn with_primary_provider(mut self, kind: ProviderKind) -> Self {
        self.primary_provider = kind;
        self
    }

    /// Enable or disable fallback to the secondary provider.
    #[must_use]
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.enable_fallback = enabled;
        self
    }

    /// Replace the validation policy.
    #[must_use]
    pub fn with_validation(mut self, validation: FileValidationSettings) -> Self {
        self.validation = validation;
        self
    }
}

/// Azure Blob Storage settings.
///
/// An empty `account` or `access_key` leaves the backend unconfigured; it then
/// reports itself as unavailable instead of failing startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AzureBlobSettings {
    /// Storage account name.
    #[serde(default)]
    pub account: String,
    /// Storage account access key.
    #[serde(default)]
    pub access_key: String,
    /// Container holding uploaded files.
    #[serde(default = "default_container")]
    pub container: String,
    /// Service endpoint; defaults to `https://{account}.blob.core.windows.net`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Public base URL (CDN or custom domain) used to build object URLs.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_container() -> String {
    "hotel-files".to_string()
}

impl Default for AzureBlobSettings {
    fn default() -> Self {
        Self {
            account: String::new(),
            access_key: String::new(),
            container: default_container(),
            endpoint: None,
            base_url: None,
        }
    }
}

impl AzureBlobSettings {
    /// True when credentials are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.account.trim().is_empty() && !self.access_key.trim().is_empty()
    }

    /// Endpoint to talk to, falling back to the public Azure endpoint.
    #[must_use]
    pub fn resolved_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => {
                endpoint.trim_end_matches('/').to_string()
            }
            _ => format!("https://{}.blob.core.windows.net", self.account),
        }
    }
}

/// Local filesystem settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageSettings {
    /// Root directory; relative paths resolve against the working directory.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// URL prefix under which the root directory is served.
    #[serde(default = "default_local_base_url")]
    pub base_url: String,
}

fn default_base_path() -> String {
    "uploads".to_string()
}

fn default_local_base_url() -> String {
    "/files".to_string()
}

impl Default for LocalStorageSettings {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            base_url: default_local_base_url(),
        }
    }
}

/// Upload validation policy.
#[derive(Debug, Clone, Deserialize)]
pub struct FileValidationSettings {
    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Allowed MIME types, compared case-insensitively.
    #[serde(default = "default_content_types")]
    pub allowed_content_types: Vec<String>,
    /// Allowed extensions including the leading dot, compared case-insensitively.
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl FileValidationSettings {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size_bytes = size;
        self
    }

    /// Set allowed content types.
    #[must_use]
    pub fn with_allowed_content_types(mut self, types: Vec<String>) -> Self {
        self.allowed_content_types = types;
        self
    }

    /// Set allowed extensions.
    #[must_use]
    pub fn with_allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.allowed_extensions = extensions;
        self
    }
}

fn default_max_file_size() -> u64 {
    FileValidationSettings::DEFAULT_MAX_FILE_SIZE
}

fn default_content_types() -> Vec<String> {
    ["image/jpeg", "image/png", "image/gif", "image/webp"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_extensions() -> Vec<String> {
    [".jpg", ".jpeg", ".png", ".gif", ".webp"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for FileValidationSettings {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            allowed_content_types: default_content_types(),
            allowed_extensions: default_extensions(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `HOTELSTORE__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("HOTELSTORE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("storage.validation.allowed_content_types")
                    .with_list_parse_key("storage.validation.allowed_extensions"),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
