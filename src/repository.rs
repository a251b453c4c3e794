//! # Version-Control Seam
//!
//! The validator never calls `git` directly. It goes through the
//! [`GitOperations`] trait, whose default implementation,
//! [`DefaultGitOperations`], wraps the functions in [`crate::git`]. Tests swap
//! in mock implementations to simulate tags, branches and blobs without
//! creating real repositories.
//!
//! Every method is a read-only query scoped to one repository path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::defaults::ROOT_LOOKUP_TIMEOUT;
use crate::error::Result;

/// Trait for git queries - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Tags whose name equals `name`, one per line (empty when none).
    fn list_tags(&self, repo: &Path, name: &str) -> Result<String>;

    /// Local or remote-tracking branches whose name contains `fragment`.
    fn list_branches(&self, repo: &Path, fragment: &str, remote: bool) -> Result<String>;

    /// The object type at `object`; an error when it does not exist.
    fn object_type(&self, repo: &Path, object: &str) -> Result<String>;

    /// Whether `object` (typically `<ref>:<path>`) exists.
    fn object_exists(&self, repo: &Path, object: &str) -> Result<bool>;

    /// The root of the working copy enclosing `dir`.
    fn toplevel(&self, dir: &Path) -> Result<PathBuf>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Clone)]
pub struct DefaultGitOperations {
    root_lookup_timeout: Duration,
}

impl DefaultGitOperations {
    pub fn new() -> Self {
        Self {
            root_lookup_timeout: ROOT_LOOKUP_TIMEOUT,
        }
    }

    /// Override the bound on working-copy root lookups.
    pub fn with_root_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.root_lookup_timeout = timeout;
        self
    }
}

impl Default for DefaultGitOperations {
    fn default() -> Self {
        Self::new()
    }
}

impl GitOperations for DefaultGitOperations {
    fn list_tags(&self, repo: &Path, name: &str) -> Result<String> {
        crate::git::list_tags(repo, name)
    }

    fn list_branches(&self, repo: &Path, fragment: &str, remote: bool) -> Result<String> {
        crate::git::list_branches(repo, fragment, remote)
    }

    fn object_type(&self, repo: &Path, object: &str) -> Result<String> {
        crate::git::object_type(repo, object)
    }

    fn object_exists(&self, repo: &Path, object: &str) -> Result<bool> {
        crate::git::object_exists(repo, object)
    }

    fn toplevel(&self, dir: &Path) -> Result<PathBuf> {
        crate::git::show_toplevel(dir, self.root_lookup_timeout)
    }
}
