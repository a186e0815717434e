//! tests/path_sanitize_tests.rs

// These tests audit identifier sanitization and target resolution against
// hostile manifest input. The focus is on path traversal and on the
// invariant that every resolved target is a direct child of the root.

use std::path::Path;

use proptest::prelude::*;
use rstest::rstest;
use scribe_extensions::paths::{CreateDir, resolve, sanitize_unique_name};

#[rstest]
// Well-formed identifiers pass through untouched
#[case("demo-ext", Some("demo-ext"))]
#[case("markdown_preview.v2", Some("markdown_preview.v2"))]
// Separators and traversal sequences are defanged, not resolved
#[case("../../etc/passwd", Some(".._.._etc_passwd"))]
#[case("..\\..\\windows", Some(".._.._windows"))]
#[case("a/b/c/d", Some("a_b_c_d"))]
// Whitespace and punctuation collapse to underscores
#[case("ext name!", Some("ext_name_"))]
// Non-ASCII letters are outside the safe alphabet
#[case("расширение", Some("__________"))]
// Too short to be an identity at all
#[case("", None)]
#[case("abc", None)]
#[case("../", None)]
fn test_sanitize_cases(#[case] input: &str, #[case] expected: Option<&str>) {
    assert_eq!(sanitize_unique_name(input).as_deref(), expected);
}

#[test]
fn test_length_check_counts_characters_not_bytes() {
    // Four cyrillic characters are eight bytes; they must still pass the
    // length check.
    assert_eq!(sanitize_unique_name("день").as_deref(), Some("____"));
}

#[test]
fn test_resolve_without_create_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("extensions");
    let resolved = resolve(&root, "demo-ext", CreateDir::No).unwrap();
    assert_eq!(resolved, root.join("demo-ext"));
    assert!(!root.exists());
}

proptest! {
    #[test]
    fn test_sanitize_emits_only_safe_characters(s in "\\PC*") {
        match sanitize_unique_name(&s) {
            Some(sanitized) => {
                let all_safe = sanitized.chars().all(|c| {
                    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
                });
                prop_assert!(all_safe);
                // Replacement is per-character, so length is preserved
                prop_assert_eq!(sanitized.chars().count(), s.chars().count());
            }
            None => prop_assert!(s.chars().count() <= 3),
        }
    }

    #[test]
    fn test_sanitize_is_idempotent(s in "\\PC*") {
        if let Some(once) = sanitize_unique_name(&s) {
            let twice = sanitize_unique_name(&once);
            prop_assert_eq!(twice.as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn test_resolved_target_is_direct_child_of_root(s in "\\PC*") {
        let root = Path::new("/opt/scribe/extensions");
        if let Some(target) = resolve(root, &s, CreateDir::No) {
            prop_assert!(target.starts_with(root));
            prop_assert_eq!(target.parent(), Some(root));
        }
    }
}
