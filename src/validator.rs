//! # Version and Existence Validation
//!
//! The [`Validator`] answers the two questions a cross-repository reference
//! raises: does the pinned revision exist, and does the target file exist
//! (at that revision, or in the working copy when nothing is pinned)?
//!
//! All answers come from read-only `git` queries made through a
//! [`GitOperations`] implementation and are memoized in a per-run
//! [`ValidationCache`]. A failing query is logged and treated as "does not
//! exist"; it is never raised to the caller.
//!
//! ## Version precedence
//!
//! [`effective_version`] picks the revision an external reference is checked
//! against: the version stated on the reference (directly or inherited from
//! its repository declaration), then the target repository's pinned ref, then
//! nothing (the checked-out state).

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::cache::ValidationCache;
use crate::config::RepositoryConfiguration;
use crate::error::Result;
use crate::path::{repository_relative, RootLookup};
use crate::reference::Reference;
use crate::repository::{DefaultGitOperations, GitOperations};
use crate::version::{resolve_ref, RefKind, VersionRef};

/// Pick the revision an external reference into `repo` is validated against.
pub fn effective_version(reference: &Reference, repo: &RepositoryConfiguration) -> Option<VersionRef> {
    if let Some(version) = reference.target_version() {
        return Some(version.clone());
    }
    repo.pinned_ref
        .as_deref()
        .map(str::trim)
        .filter(|pinned| !pinned.is_empty())
        .map(resolve_ref)
}

/// Read-only existence checks against working copies.
pub struct Validator {
    git: Box<dyn GitOperations>,
    cache: ValidationCache,
}

impl Validator {
    /// A validator backed by the system `git` and a fresh cache.
    pub fn new() -> Self {
        Self::with_operations(Box::new(DefaultGitOperations::new()))
    }

    /// A validator using custom git operations, primarily for tests.
    pub fn with_operations(git: Box<dyn GitOperations>) -> Self {
        Self {
            git,
            cache: ValidationCache::new(),
        }
    }

    /// The cache backing this validator. Clearing it forces every later
    /// check to hit the filesystem and `git` again.
    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Whether `version` exists in the repository at `repo`.
    ///
    /// Tags must match exactly; branches match local or remote-tracking
    /// branches by substring; commits must name an existing object.
    pub fn ref_exists(&self, repo: &Path, version: &VersionRef) -> Result<bool> {
        self.cache.ref_exists(repo, version, || {
            let answer = match version.kind {
                RefKind::Tag => self
                    .git
                    .list_tags(repo, &version.version)
                    .map(|out| !out.is_empty()),
                RefKind::Branch => self
                    .git
                    .list_branches(repo, &version.version, false)
                    .and_then(|local| {
                        if !local.is_empty() {
                            return Ok(true);
                        }
                        self.git
                            .list_branches(repo, &version.version, true)
                            .map(|remote| !remote.is_empty())
                    }),
                RefKind::Commit => self.git.object_type(repo, &version.version).map(|_| true),
            };
            match answer {
                Ok(exists) => {
                    debug!("{} in {}: exists={}", version, repo.display(), exists);
                    exists
                }
                Err(e) => {
                    warn!("Could not verify {} in {}: {}", version, repo.display(), e);
                    false
                }
            }
        })
    }

    /// Whether a file exists on disk.
    pub fn file_exists(&self, path: &Path) -> Result<bool> {
        self.cache.file_exists(path)
    }

    /// Whether `relative` exists in `repo`, at `version` when one is given.
    ///
    /// Without a version this is a plain filesystem check beneath `repo`.
    /// Branches are looked up in the local namespace first, then in the
    /// remote-tracking one.
    pub fn file_exists_at_ref(
        &self,
        repo: &Path,
        relative: &str,
        version: Option<&VersionRef>,
    ) -> Result<bool> {
        let relative = repository_relative(relative);
        let Some(version) = version else {
            return self.file_exists(&repo.join(&relative));
        };

        let mut candidates = vec![version.qualified()];
        candidates.extend(version.remote_qualified());

        for qualified in candidates {
            let object = format!("{}:{}", qualified, relative);
            let exists = self.cache.object_exists(repo, &object, || {
                match self.git.object_exists(repo, &object) {
                    Ok(exists) => exists,
                    Err(e) => {
                        warn!("Could not query {} in {}: {}", object, repo.display(), e);
                        false
                    }
                }
            })?;
            if exists {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl RootLookup for Validator {
    fn repository_root(&self, dir: &Path) -> Option<PathBuf> {
        let lookup = self.cache.repository_root(dir, || match self.git.toplevel(dir) {
            Ok(root) => Some(root),
            Err(e) => {
                debug!("Working-copy root lookup failed for {}: {}", dir.display(), e);
                None
            }
        });
        match lookup {
            Ok(root) => root,
            Err(e) => {
                warn!("Working-copy root cache unavailable: {}", e);
                None
            }
        }
    }
}
