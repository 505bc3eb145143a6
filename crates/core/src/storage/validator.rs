//! Upload validation against the configured file policy.

use hotelstore_shared::FileValidationSettings;
use serde::Serialize;
use thiserror::Error;

/// A single violated upload rule.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationError {
    /// File is larger than the configured maximum.
    #[error("File size exceeds the maximum allowed size of {}.", size_limit(*.max))]
    FileTooLarge {
        /// Declared size in bytes.
        size: u64,
        /// Configured maximum in bytes.
        max: u64,
    },

    /// MIME type is not on the allow-list.
    #[error("Content type '{content_type}' is not allowed.")]
    InvalidContentType {
        /// The rejected content type.
        content_type: String,
    },

    /// File extension is not on the allow-list.
    #[error("File extension '{extension}' is not allowed.")]
    InvalidExtension {
        /// The rejected extension, empty when the name has none.
        extension: String,
    },
}

const MIB: u64 = 1024 * 1024;

/// `10MB` for whole mebibytes, otherwise the exact byte count.
fn size_limit(max: u64) -> String {
    if max >= MIB && max % MIB == 0 {
        format!("{}MB", max / MIB)
    } else {
        format!("{max} bytes")
    }
}

impl ValidationError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "Storage.FileTooLarge",
            Self::InvalidContentType { .. } => "Storage.InvalidContentType",
            Self::InvalidExtension { .. } => "Storage.InvalidExtension",
        }
    }
}

/// Checks name, content type and size before any I/O happens.
#[derive(Debug, Clone, Default)]
pub struct FileValidator {
    settings: FileValidationSettings,
}

impl FileValidator {
    /// Create a validator for the given policy.
    #[must_use]
    pub fn new(settings: FileValidationSettings) -> Self {
        Self { settings }
    }

    /// The policy this validator enforces.
    #[must_use]
    pub fn settings(&self) -> &FileValidationSettings {
        &self.settings
    }

    /// Validate an upload.
    ///
    /// Every rule is evaluated; the error lists one entry per violated rule.
    pub fn validate(
        &self,
        file_name: &str,
        content_type: &str,
        size_in_bytes: u64,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if size_in_bytes > self.settings.max_file_size_bytes {
            errors.push(ValidationError::FileTooLarge {
                size: size_in_bytes,
                max: self.settings.max_file_size_bytes,
            });
        }

        if !contains_ignore_case(&self.settings.allowed_content_types, content_type) {
            errors.push(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
            });
        }

        let extension = file_extension(file_name);
        if !contains_ignore_case(&self.settings.allowed_extensions, extension) {
            errors.push(ValidationError::InvalidExtension {
                extension: extension.to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn contains_ignore_case(allowed: &[String], value: &str) -> bool {
    allowed.iter().any(|a| a.eq_ignore_ascii_case(value))
}

/// Extension of the last path segment including the leading dot.
///
/// Returns an empty string when the name has no extension or ends with a dot.
#[must_use]
pub fn file_extension(file_name: &str) -> &str {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[idx..],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn validator() -> FileValidator {
        FileValidator::new(FileValidationSettings::default())
    }

    #[rstest]
    #[case("photo.png", "image/png", 2 * MIB)]
    #[case("PHOTO.JPG", "IMAGE/JPEG", 1)]
    #[case("lobby.jpeg", "image/jpeg", 10 * MIB)]
    #[case("pool.webp", "image/webp", 0)]
    #[case("dir/sub/anim.GIF", "image/gif", 512)]
    fn test_valid_uploads(#[case] name: &str, #[case] content_type: &str, #[case] size: u64) {
        assert_eq!(validator().validate(name, content_type, size), Ok(()));
    }

    #[test]
    fn test_oversized_file_yields_single_error() {
        let errors = validator()
            .validate("photo.png", "image/png", 50 * MIB)
            .unwrap_err();

        assert_eq!(
            errors,
            vec![ValidationError::FileTooLarge {
                size: 50 * MIB,
                max: 10 * MIB
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "File size exceeds the maximum allowed size of 10MB."
        );
    }

    #[rstest]
    #[case(1024, "1024 bytes")]
    #[case(MIB + 1, "1048577 bytes")]
    #[case(MIB, "1MB")]
    #[case(25 * MIB, "25MB")]
    fn test_size_limit_message(#[case] max: u64, #[case] expected: &str) {
        let err = ValidationError::FileTooLarge { size: max + 1, max };
        assert_eq!(
            err.to_string(),
            format!("File size exceeds the maximum allowed size of {expected}.")
        );
    }

    #[test]
    fn test_two_violations_yield_two_errors() {
        let errors = validator()
            .validate("report.pdf", "application/pdf", 1024)
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code(), "Storage.InvalidContentType");
        assert_eq!(errors[1].code(), "Storage.InvalidExtension");
    }

    #[test]
    fn test_all_rules_violated() {
        let errors = validator()
            .validate("malware.exe", "application/x-msdownload", 11 * MIB)
            .unwrap_err();

        let codes: Vec<_> = errors.iter().map(ValidationError::code).collect();
        assert_eq!(
            codes,
            [
                "Storage.FileTooLarge",
                "Storage.InvalidContentType",
                "Storage.InvalidExtension"
            ]
        );
    }

    #[test]
    fn test_missing_extension_is_rejected() {
        let errors = validator().validate("README", "image/png", 10).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidExtension {
                extension: String::new()
            }]
        );
    }

    #[test]
    fn test_custom_policy() {
        let settings = FileValidationSettings::default()
            .with_max_file_size(100)
            .with_allowed_content_types(vec!["application/pdf".to_string()])
            .with_allowed_extensions(vec![".pdf".to_string()]);
        let validator = FileValidator::new(settings);

        assert!(validator.validate("a.pdf", "application/pdf", 100).is_ok());
        assert!(validator.validate("a.png", "image/png", 10).is_err());
    }

    #[rstest]
    #[case("photo.png", ".png")]
    #[case("archive.tar.gz", ".gz")]
    #[case("noext", "")]
    #[case("trailing.", "")]
    #[case(".hidden", ".hidden")]
    #[case("folder.v2/file", "")]
    #[case("C:\\uploads\\pic.JPG", ".JPG")]
    fn test_file_extension(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(file_extension(name), expected);
    }

    #[test]
    fn test_errors_serialize_with_rule_tag() {
        let json = serde_json::to_value(ValidationError::InvalidExtension {
            extension: ".exe".to_string(),
        })
        .expect("serialize");
        assert_eq!(json["rule"], "invalid_extension");
        assert_eq!(json["extension"], ".exe");
    }
}

#[cfg(test)]
#[path = "validator_props.rs"]
mod property_tests;
