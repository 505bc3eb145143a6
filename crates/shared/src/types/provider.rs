//! Storage backend kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of storage backends a file can live on.
///
/// The canonical names (`"AzureBlob"`, `"LocalFile"`) are what gets recorded
/// on a stored file, so they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ProviderKind {
    /// Azure Blob Storage container.
    AzureBlob,
    /// Directory on the local filesystem.
    LocalFile,
}

/// Returned when a provider name matches no known backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown storage provider: {0}")]
pub struct UnknownProvider(pub String);

impl ProviderKind {
    /// Every backend kind.
    pub const ALL: [Self; 2] = [Self::AzureBlob, Self::LocalFile];

    /// Canonical name persisted alongside stored files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AzureBlob => "AzureBlob",
            Self::LocalFile => "LocalFile",
        }
    }

    /// The backend used when this one fails.
    #[must_use]
    pub const fn counterpart(self) -> Self {
        match self {
            Self::AzureBlob => Self::LocalFile,
            Self::LocalFile => Self::AzureBlob,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "azureblob" | "azure_blob" => Ok(Self::AzureBlob),
            "localfile" | "local_file" | "local" => Ok(Self::LocalFile),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = UnknownProvider;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProviderKind> for &'static str {
    fn from(kind: ProviderKind) -> Self {
        kind.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AzureBlob", ProviderKind::AzureBlob)]
    #[case("azureblob", ProviderKind::AzureBlob)]
    #[case("AZURE_BLOB", ProviderKind::AzureBlob)]
    #[case("LocalFile", ProviderKind::LocalFile)]
    #[case(" localfile ", ProviderKind::LocalFile)]
    #[case("local", ProviderKind::LocalFile)]
    fn test_parse_case_insensitive(#[case] input: &str, #[case] expected: ProviderKind) {
        assert_eq!(input.parse::<ProviderKind>(), Ok(expected));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "s3".parse::<ProviderKind>(),
            Err(UnknownProvider("s3".to_string()))
        );
    }

    #[test]
    fn test_counterpart_is_involution() {
        for kind in ProviderKind::ALL {
            assert_ne!(kind.counterpart(), kind);
            assert_eq!(kind.counterpart().counterpart(), kind);
        }
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.to_string().parse::<ProviderKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&ProviderKind::LocalFile).expect("serialize");
        assert_eq!(json, "\"LocalFile\"");

        let parsed: ProviderKind = serde_json::from_str("\"azureblob\"").expect("deserialize");
        assert_eq!(parsed, ProviderKind::AzureBlob);

        assert!(serde_json::from_str::<ProviderKind>("\"ftp\"").is_err());
    }
}
