//! Property-based tests for version reference parsing.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::version::{infer_kind, is_commit_hash, parse_ref, resolve_ref, RefKind, VersionRef};
    use proptest::prelude::*;

    fn ref_name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9._-][a-zA-Z0-9._/-]{0,30}"
    }

    fn commit_hash() -> impl Strategy<Value = String> {
        "[0-9a-f]{40}"
    }

    proptest! {
        /// Property: formatting a tag and parsing it back is lossless
        #[test]
        fn tag_round_trips(name in ref_name()) {
            let original = VersionRef::new(name, RefKind::Tag);
            prop_assert_eq!(parse_ref(&original.qualified()), original);
        }

        /// Property: formatting a branch and parsing it back is lossless
        #[test]
        fn branch_round_trips(name in ref_name()) {
            let original = VersionRef::new(name, RefKind::Branch);
            prop_assert_eq!(parse_ref(&original.qualified()), original);
        }

        /// Property: formatting a commit and parsing it back is lossless
        #[test]
        fn commit_round_trips(hash in commit_hash()) {
            let original = VersionRef::new(hash, RefKind::Commit);
            prop_assert_eq!(parse_ref(&original.qualified()), original);
        }

        /// Property: the parser is total and never loses a bare string
        #[test]
        fn parse_is_total(raw in ".*") {
            let parsed = parse_ref(&raw);
            if !raw.starts_with("refs/tags/") && !raw.starts_with("refs/heads/") {
                prop_assert_eq!(parsed.version, raw);
            }
        }

        /// Property: inference and parsing agree on commits
        #[test]
        fn commit_classification_agrees(raw in "[0-9a-fA-F]{38,42}") {
            let expected = is_commit_hash(&raw);
            prop_assert_eq!(parse_ref(&raw).kind == RefKind::Commit, expected);
            prop_assert_eq!(infer_kind(&raw) == RefKind::Commit, expected);
        }

        /// Property: resolving an already-qualified ref keeps its kind
        #[test]
        fn resolve_keeps_namespace_kind(name in ref_name(), tag in any::<bool>()) {
            let kind = if tag { RefKind::Tag } else { RefKind::Branch };
            let original = VersionRef::new(name, kind);
            prop_assert_eq!(resolve_ref(&original.qualified()), original);
        }
    }
}
