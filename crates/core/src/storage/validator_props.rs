//! Property tests for upload validation.

use super::*;
use proptest::prelude::*;

const ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

fn policy(max: u64) -> FileValidator {
    FileValidator::new(FileValidationSettings::default().with_max_file_size(max))
}

// Any name/type/size inside the policy is accepted, regardless of case.
proptest! {
    #[test]
    fn prop_valid_inputs_accepted(
        stem in "[a-zA-Z0-9_-]{1,40}",
        ext_idx in 0usize..ALLOWED_EXTENSIONS.len(),
        type_idx in 0usize..ALLOWED_TYPES.len(),
        upper in any::<bool>(),
        max in 1u64..50_000_000,
        size_seed in any::<u64>(),
    ) {
        let ext = ALLOWED_EXTENSIONS[ext_idx];
        let ext = if upper { ext.to_uppercase() } else { ext.to_string() };
        let content_type = ALLOWED_TYPES[type_idx];
        let size = size_seed % (max + 1);

        let result = policy(max).validate(&format!("{stem}.{ext}"), content_type, size);
        prop_assert!(result.is_ok());
    }
}

// Anything over the limit is rejected with exactly one size error when
// the other rules hold.
proptest! {
    #[test]
    fn prop_oversized_rejected(
        max in 0u64..10_000_000,
        excess in 1u64..10_000_000,
    ) {
        let errors = policy(max)
            .validate("photo.png", "image/png", max + excess)
            .unwrap_err();

        prop_assert_eq!(errors.len(), 1);
        let is_too_large = matches!(errors[0], ValidationError::FileTooLarge { .. });
        prop_assert!(is_too_large);
    }
}

// The number of errors equals the number of violated rules.
proptest! {
    #[test]
    fn prop_one_error_per_violated_rule(
        too_large in any::<bool>(),
        bad_type in any::<bool>(),
        bad_ext in any::<bool>(),
    ) {
        let size = if too_large { 2048 } else { 1024 };
        let content_type = if bad_type { "text/html" } else { "image/png" };
        let name = if bad_ext { "page.html" } else { "page.png" };

        let expected = usize::from(too_large) + usize::from(bad_type) + usize::from(bad_ext);
        let found = policy(1024)
            .validate(name, content_type, size)
            .err()
            .map_or(0, |errors| errors.len());

        prop_assert_eq!(found, expected);
    }
}

// Content types outside the allow-list are always reported.
proptest! {
    #[test]
    fn prop_unknown_content_type_rejected(content_type in "(application|text|video)/[a-z0-9-]{1,20}") {
        let errors = policy(1024).validate("a.png", &content_type, 1).unwrap_err();
        let has_type_error = errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidContentType { .. }));
        prop_assert!(has_type_error);
    }
}
