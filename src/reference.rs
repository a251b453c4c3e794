//! # Reference Data Model
//!
//! Types shared by every stage of a validation run:
//!
//! - [`RepositoryDeclaration`]: an alias bound to a canonical repository name
//!   inside a pipeline document's `resources.repositories` section.
//! - [`Reference`]: one `template:`/`extends:` pointer found in a document, or
//!   a declaration surfaced as a zero-position metadata entry. What kind of
//!   pointer it is lives in [`ReferenceKind`], so a local reference cannot
//!   carry a repository and a declaration cannot be checked on disk.
//! - [`Outcome`], [`ValidatedReference`], [`ValidationResult`]: the verdicts and
//!   the bucketed report a run returns.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::REPOSITORY_MARKER_PREFIX;
use crate::version::VersionRef;

/// An alias declared for a repository inside a pipeline document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDeclaration {
    pub alias: String,
    pub canonical_name: String,
    pub version: Option<VersionRef>,
}

impl RepositoryDeclaration {
    pub fn new(
        alias: impl Into<String>,
        canonical_name: impl Into<String>,
        version: Option<VersionRef>,
    ) -> Self {
        Self {
            alias: alias.into(),
            canonical_name: canonical_name.into(),
            version,
        }
    }
}

/// What a reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A file in the same repository as the source document.
    Local,
    /// A file in another repository, addressed through an alias.
    External {
        repository: String,
        version: Option<VersionRef>,
    },
    /// A repository declaration reported for visibility only.
    Declaration {
        alias: String,
        canonical_name: String,
        version: Option<VersionRef>,
    },
}

/// A reference extracted from a pipeline document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// The document the reference was found in.
    pub source: PathBuf,
    /// The referenced file as written, or a repository marker for declarations.
    pub target: String,
    pub kind: ReferenceKind,
    /// 1-based line of the match; 0 for declarations, which have no exact position.
    pub line_number: usize,
    /// The trimmed source line (or a synthetic summary for declarations).
    pub context: String,
}

impl Reference {
    pub fn local(source: &Path, target: &str, line_number: usize, context: &str) -> Self {
        Self {
            source: source.to_path_buf(),
            target: target.to_string(),
            kind: ReferenceKind::Local,
            line_number,
            context: context.trim().to_string(),
        }
    }

    pub fn external(
        source: &Path,
        target: &str,
        repository: &str,
        line_number: usize,
        context: &str,
    ) -> Self {
        Self {
            source: source.to_path_buf(),
            target: target.to_string(),
            kind: ReferenceKind::External {
                repository: repository.to_string(),
                version: None,
            },
            line_number,
            context: context.trim().to_string(),
        }
    }

    /// Surface a declaration as an always-valid metadata entry.
    pub fn declaration(source: &Path, declaration: &RepositoryDeclaration) -> Self {
        Self {
            source: source.to_path_buf(),
            target: format!("{}{}", REPOSITORY_MARKER_PREFIX, declaration.alias),
            kind: ReferenceKind::Declaration {
                alias: declaration.alias.clone(),
                canonical_name: declaration.canonical_name.clone(),
                version: declaration.version.clone(),
            },
            line_number: 0,
            context: format!(
                "repository {} -> {}",
                declaration.alias, declaration.canonical_name
            ),
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self.kind, ReferenceKind::Declaration { .. })
    }

    /// The alias an external reference targets.
    pub fn target_repository(&self) -> Option<&str> {
        match &self.kind {
            ReferenceKind::External { repository, .. } => Some(repository),
            ReferenceKind::Local | ReferenceKind::Declaration { .. } => None,
        }
    }

    /// The version stated on the reference itself (directly or back-filled).
    pub fn target_version(&self) -> Option<&VersionRef> {
        match &self.kind {
            ReferenceKind::External { version, .. } | ReferenceKind::Declaration { version, .. } => {
                version.as_ref()
            }
            ReferenceKind::Local => None,
        }
    }

    /// Deduplication key: source, line and target text.
    pub fn key(&self) -> (PathBuf, usize, String) {
        (self.source.clone(), self.line_number, self.target.clone())
    }

    /// A copy of this reference with a rewritten target.
    pub fn with_target(&self, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..self.clone()
        }
    }

    /// A copy of an external reference with its version set. Other kinds are
    /// returned unchanged.
    pub fn with_version(&self, version: VersionRef) -> Self {
        let mut copy = self.clone();
        if let ReferenceKind::External { version: slot, .. } = &mut copy.kind {
            *slot = Some(version);
        }
        copy
    }
}

/// The verdict for a single reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Valid,
    BrokenPath,
    MissingRepository,
    InvalidVersion,
}

/// A reference together with its verdict.
///
/// For failures the reference's `target` has already been rewritten to carry
/// the resolved path or a readable description of what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedReference {
    pub reference: Reference,
    pub outcome: Outcome,
}

impl ValidatedReference {
    pub fn new(reference: Reference, outcome: Outcome) -> Self {
        Self { reference, outcome }
    }
}

/// Counters kept for diagnostics; they never affect validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub repositories_scanned: usize,
    pub repositories_skipped: usize,
    pub files_scanned: usize,
    pub extraction_failures: usize,
}

/// The bucketed result of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub valid_references: Vec<ValidatedReference>,
    pub broken_references: Vec<ValidatedReference>,
    pub version_issues: Vec<ValidatedReference>,
    pub diagnostics: RunDiagnostics,
}

impl ValidationResult {
    /// Sort verdicts into buckets, preserving their order.
    pub fn from_outcomes(
        outcomes: impl IntoIterator<Item = ValidatedReference>,
        diagnostics: RunDiagnostics,
    ) -> Self {
        let mut result = Self {
            diagnostics,
            ..Self::default()
        };
        for validated in outcomes {
            match validated.outcome {
                Outcome::Valid => result.valid_references.push(validated),
                Outcome::BrokenPath | Outcome::MissingRepository => {
                    result.broken_references.push(validated)
                }
                Outcome::InvalidVersion => result.version_issues.push(validated),
            }
        }
        result.is_valid = result.broken_references.is_empty() && result.version_issues.is_empty();
        result
    }

    /// Number of references across all buckets.
    pub fn total(&self) -> usize {
        self.valid_references.len() + self.broken_references.len() + self.version_issues.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::RefKind;

    fn sample_external() -> Reference {
        Reference::external(
            Path::new("ci/pipeline.yml"),
            "build.yml",
            "templates",
            4,
            "  - template: build.yml@templates  ",
        )
    }

    #[test]
    fn test_local_reference_has_no_repository() {
        let reference = Reference::local(Path::new("a.yml"), "b.yml", 2, "template: b.yml");
        assert_eq!(reference.target_repository(), None);
        assert_eq!(reference.target_version(), None);
        assert!(!reference.is_declaration());
    }

    #[test]
    fn test_external_reference_trims_context() {
        let reference = sample_external();
        assert_eq!(reference.target_repository(), Some("templates"));
        assert_eq!(reference.context, "- template: build.yml@templates");
    }

    #[test]
    fn test_declaration_reference() {
        let declaration = RepositoryDeclaration::new(
            "templates",
            "org/templates",
            Some(VersionRef::new("v1", RefKind::Tag)),
        );
        let reference = Reference::declaration(Path::new("a.yml"), &declaration);
        assert_eq!(reference.target, "repository:templates");
        assert_eq!(reference.line_number, 0);
        assert!(reference.is_declaration());
        assert_eq!(reference.target_repository(), None);
        assert_eq!(reference.target_version(), declaration.version.as_ref());
    }

    #[test]
    fn test_with_version_only_touches_external() {
        let version = VersionRef::new("main", RefKind::Branch);
        let updated = sample_external().with_version(version.clone());
        assert_eq!(updated.target_version(), Some(&version));

        let local = Reference::local(Path::new("a.yml"), "b.yml", 1, "");
        assert_eq!(local.with_version(version), local);
    }

    #[test]
    fn test_with_target_copies() {
        let original = sample_external();
        let rewritten = original.with_target("missing");
        assert_eq!(original.target, "build.yml");
        assert_eq!(rewritten.target, "missing");
        assert_eq!(rewritten.line_number, original.line_number);
    }

    #[test]
    fn test_result_buckets() {
        let reference = sample_external();
        let result = ValidationResult::from_outcomes(
            vec![
                ValidatedReference::new(reference.clone(), Outcome::Valid),
                ValidatedReference::new(reference.clone(), Outcome::MissingRepository),
                ValidatedReference::new(reference.clone(), Outcome::BrokenPath),
                ValidatedReference::new(reference, Outcome::InvalidVersion),
            ],
            RunDiagnostics::default(),
        );
        assert!(!result.is_valid);
        assert_eq!(result.valid_references.len(), 1);
        assert_eq!(result.broken_references.len(), 2);
        assert_eq!(result.version_issues.len(), 1);
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let result = ValidationResult::from_outcomes(Vec::new(), RunDiagnostics::default());
        assert!(result.is_valid);
        assert_eq!(result.total(), 0);
    }
}
