//! Path resolution for references.
//!
//! [`resolve`] turns a reference target into the filesystem location it
//! should exist at:
//!
//! - repository markers (declarations) are passed through untouched;
//! - cross-repository targets are joined beneath the target repository's root
//!   (a leading `/` is dropped first), or reported as
//!   [`ResolvedPath::UnresolvedRepository`] when the alias is unknown;
//! - root-anchored local targets are joined beneath the working-copy root of
//!   the source file, falling back to the current directory;
//! - relative local targets are joined against the source file's directory.
//!
//! Resolution never fails; problems surface in the returned value.

use std::fmt;
use std::path::{Path, PathBuf};

use log::warn;

use crate::config::{find_repository, RepositoryConfiguration};
use crate::defaults::REPOSITORY_MARKER_PREFIX;

/// Finds the working-copy root enclosing a directory.
pub trait RootLookup {
    /// `None` when the directory is not inside a working copy or the lookup failed.
    fn repository_root(&self, dir: &Path) -> Option<PathBuf>;
}

/// Where a reference target points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    /// A repository marker, reported but never checked on disk.
    Marker(String),
    /// A concrete filesystem location.
    File(PathBuf),
    /// The target names a repository alias no configuration answers to.
    UnresolvedRepository { alias: String, target: String },
}

impl ResolvedPath {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ResolvedPath::File(path) => Some(path),
            ResolvedPath::Marker(_) | ResolvedPath::UnresolvedRepository { .. } => None,
        }
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedPath::Marker(marker) => f.write_str(marker),
            ResolvedPath::File(path) => write!(f, "{}", path.display()),
            ResolvedPath::UnresolvedRepository { alias, target } => {
                write!(f, "<unresolved repository '{}'>/{}", alias, target)
            }
        }
    }
}

/// Whether a target is written relative to a repository root.
pub fn is_root_anchored(target: &str) -> bool {
    target.starts_with('/') || target.starts_with('\\')
}

/// The target with root anchors and `./` prefixes removed, as a path
/// relative to a repository root using `/` separators.
pub fn repository_relative(target: &str) -> String {
    let mut relative = target.trim_start_matches(['/', '\\']);
    while let Some(rest) = relative.strip_prefix("./") {
        relative = rest;
    }
    relative.replace('\\', "/")
}

/// Join `target` beneath `root`, dropping a root anchor.
pub fn join_beneath(root: &Path, target: &str) -> PathBuf {
    if is_root_anchored(target) {
        root.join(target.trim_start_matches(['/', '\\']))
    } else {
        root.join(target)
    }
}

/// Compute where `target`, found in `source`, points.
pub fn resolve(
    source: &Path,
    target: &str,
    target_repository: Option<&str>,
    repositories: &[RepositoryConfiguration],
    roots: &dyn RootLookup,
) -> ResolvedPath {
    if target.starts_with(REPOSITORY_MARKER_PREFIX) {
        return ResolvedPath::Marker(target.to_string());
    }

    if let Some(alias) = target_repository {
        return match find_repository(repositories, alias) {
            Some(repo) => ResolvedPath::File(join_beneath(&repo.path, target)),
            None => ResolvedPath::UnresolvedRepository {
                alias: alias.to_string(),
                target: target.to_string(),
            },
        };
    }

    let source_dir = source.parent().unwrap_or_else(|| Path::new(""));
    if is_root_anchored(target) {
        let root = match roots.repository_root(source_dir) {
            Some(root) => root,
            None => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                warn!(
                    "No working-copy root found for {}; resolving {} against {}",
                    source.display(),
                    target,
                    cwd.display()
                );
                cwd
            }
        };
        return ResolvedPath::File(join_beneath(&root, target));
    }

    ResolvedPath::File(source_dir.join(target))
}
