//! Default values for pipeline-refcheck.
//!
//! This module provides centralized constants used across the engine and the
//! commands, ensuring consistency and avoiding duplication.

use std::time::Duration;

/// Default file name of the repository list read by the CLI.
pub const DEFAULT_CONFIG_FILENAME: &str = "refcheck.yaml";

/// Name given to the single configuration created from a bare path argument.
pub const SYNTHETIC_REPOSITORY_NAME: &str = "self";

/// Namespace prefix of tag refs.
pub const TAGS_NAMESPACE: &str = "refs/tags/";

/// Namespace prefix of local branch refs.
pub const BRANCHES_NAMESPACE: &str = "refs/heads/";

/// Namespace prefix of remote-tracking branch refs.
pub const REMOTE_BRANCHES_NAMESPACE: &str = "refs/remotes/origin/";

/// Prefix that tags a reference target as a repository declaration marker.
pub const REPOSITORY_MARKER_PREFIX: &str = "repository:";

/// Upper bound on `git rev-parse --show-toplevel` lookups.
pub const ROOT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Number of lines after a `repository:` marker searched for `name:` and `ref:`
/// when recovering declarations from documents that do not parse.
pub const DECLARATION_SCAN_WINDOW: usize = 6;

/// Maximum directory depth searched when discovering repositories.
pub const REPOSITORY_DISCOVERY_DEPTH: usize = 3;

/// Directories skipped when scanning from an implicit root.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "target",
    "node_modules",
    "bin",
    "obj",
    "dist",
    "build",
    "out",
];
