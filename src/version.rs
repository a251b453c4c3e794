//! # Version Reference Parsing
//!
//! Pipeline repository declarations pin a revision with a raw `ref:` string
//! such as `refs/tags/v1.2.0`, `refs/heads/main` or a full commit hash. This
//! module classifies those strings into a [`VersionRef`] (version plus
//! [`RefKind`]) and formats them back into the fully-qualified form that `git`
//! understands.
//!
//! ## Two classifiers
//!
//! - [`parse_ref`] is the canonical parser used for declarations. It is total:
//!   anything that is neither namespaced nor a 40-character hash is treated as
//!   a branch.
//! - [`infer_kind`] is used only where a ref arrives with no kind at all (a
//!   repository's pinned ref from the caller's configuration). It additionally
//!   recognises `v<digit>...` as a tag.
//!
//! [`resolve_ref`] combines the two: namespaced strings go through
//! [`parse_ref`], bare strings through [`infer_kind`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defaults::{BRANCHES_NAMESPACE, REMOTE_BRANCHES_NAMESPACE, TAGS_NAMESPACE};

/// The kind of revision a version string names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Tag,
    Branch,
    Commit,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefKind::Tag => "tag",
            RefKind::Branch => "branch",
            RefKind::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// A version string together with its classified kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRef {
    pub version: String,
    pub kind: RefKind,
}

impl VersionRef {
    pub fn new(version: impl Into<String>, kind: RefKind) -> Self {
        Self {
            version: version.into(),
            kind,
        }
    }

    /// The fully-qualified ref: namespaced for tags and branches, the raw hash
    /// for commits.
    pub fn qualified(&self) -> String {
        match self.kind {
            RefKind::Tag => format!("{}{}", TAGS_NAMESPACE, self.version),
            RefKind::Branch => format!("{}{}", BRANCHES_NAMESPACE, self.version),
            RefKind::Commit => self.version.clone(),
        }
    }

    /// The remote-tracking form of a branch ref. `None` for other kinds.
    pub fn remote_qualified(&self) -> Option<String> {
        match self.kind {
            RefKind::Branch => Some(format!("{}{}", REMOTE_BRANCHES_NAMESPACE, self.version)),
            RefKind::Tag | RefKind::Commit => None,
        }
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.version)
    }
}

/// Whether `value` is a full 40-character hexadecimal object name.
pub fn is_commit_hash(value: &str) -> bool {
    value.len() == 40 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Classify a raw ref string.
///
/// Priority: tags namespace, branches namespace, full commit hash, then the
/// branch fallback. Never fails.
///
/// ```
/// use pipeline_refcheck::version::{parse_ref, RefKind};
///
/// let parsed = parse_ref("refs/tags/v1.2.0");
/// assert_eq!(parsed.version, "v1.2.0");
/// assert_eq!(parsed.kind, RefKind::Tag);
///
/// assert_eq!(parse_ref("release-2024").kind, RefKind::Branch);
/// ```
pub fn parse_ref(raw: &str) -> VersionRef {
    if let Some(tag) = raw.strip_prefix(TAGS_NAMESPACE) {
        return VersionRef::new(tag, RefKind::Tag);
    }
    if let Some(branch) = raw.strip_prefix(BRANCHES_NAMESPACE) {
        return VersionRef::new(branch, RefKind::Branch);
    }
    if is_commit_hash(raw) {
        return VersionRef::new(raw, RefKind::Commit);
    }
    VersionRef::new(raw, RefKind::Branch)
}

/// Infer the kind of a bare version string from its shape.
///
/// 40 hex characters is a commit, `v` followed by a digit is a tag, anything
/// else is a branch.
pub fn infer_kind(version: &str) -> RefKind {
    if is_commit_hash(version) {
        return RefKind::Commit;
    }
    let mut chars = version.chars();
    if chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return RefKind::Tag;
    }
    RefKind::Branch
}

/// Resolve a ref that carries no explicit kind.
///
/// Namespaced refs keep the kind their namespace states; bare refs get
/// [`infer_kind`].
pub fn resolve_ref(raw: &str) -> VersionRef {
    if raw.starts_with(TAGS_NAMESPACE) || raw.starts_with(BRANCHES_NAMESPACE) {
        parse_ref(raw)
    } else {
        VersionRef::new(raw, infer_kind(raw))
    }
}
