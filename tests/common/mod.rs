//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_file("main/pipeline.yml", pipelines::LOCAL_TEMPLATE)
//!         .with_file("main/build.yml", pipelines::STEPS);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::pipelines;
    #[allow(unused_imports)]
    pub use super::{git_available, TestFixture};
}

/// Common pipeline YAML snippets for testing.
#[allow(dead_code)]
pub mod pipelines {
    /// A step list with no references.
    pub const STEPS: &str = "steps:\n- script: echo hello\n";

    /// A single local template reference.
    pub const LOCAL_TEMPLATE: &str = "steps:\n- template: build.yml\n";

    /// A cross-repository reference through the `templates` alias.
    pub const EXTERNAL_TEMPLATE: &str = "steps:\n- template: build.yml@templates\n";

    /// Declares `templates` pinned to a tag that fixtures never create.
    pub const PINNED_TO_MISSING_TAG: &str = r#"
resources:
  repositories:
  - repository: templates
    type: git
    name: org/templates
    ref: refs/tags/v9.9.9
steps:
- template: build.yml@templates
"#;

    /// A reference through an alias nothing answers to.
    pub const UNKNOWN_ALIAS: &str = "steps:\n- template: build.yml@unknown\n";
}

/// Whether a usable `git` binary is on the PATH.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// A temporary workspace holding one or more repository directories.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_file("main/pipeline.yml", pipelines::EXTERNAL_TEMPLATE)
///     .with_file("templates/build.yml", pipelines::STEPS);
///
/// let mut cmd = fixture.command();
/// cmd.arg("validate")
///     .arg("--repo")
///     .arg(format!("main={}", fixture.path().join("main").display()))
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a binary file with the given path and content.
    pub fn with_binary_file(self, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(content)
            .expect("Failed to write binary file");
        self
    }

    /// Add a `refcheck.yaml` repository list with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("refcheck.yaml", content)
    }

    /// Turn the directory `repo` into a git repository with everything in it
    /// committed on `main`, and tag that commit with each of `tags`.
    pub fn with_git_repo(self, repo: &str, tags: &[&str]) -> Self {
        let dir = self.path().join(repo);
        std::fs::create_dir_all(&dir).expect("Failed to create repository directory");
        git(&dir, &["init", "--quiet"]);
        git(&dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&dir, &["add", "--all"]);
        git(&dir, &["commit", "--quiet", "--allow-empty", "-m", "initial"]);
        for tag in tags {
            git(&dir, &["tag", tag]);
        }
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a child of the workspace.
    pub fn join(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Get the path to the repository list.
    pub fn config_path(&self) -> PathBuf {
        self.join("refcheck.yaml")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `--repo` value for the workspace directory `dir`.
    pub fn repo_arg(&self, name: &str, dir: &str) -> String {
        format!("{}={}", name, self.join(dir).display())
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pipeline-refcheck");
        cmd.current_dir(self.path())
            .env_remove("REFCHECK_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn git(repo: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["-c", "user.name=refcheck", "-c", "user.email=refcheck@example.com"])
        .args(args)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_file_creates_parents() {
        let fixture = TestFixture::new().with_file("main/ci/pipeline.yml", pipelines::STEPS);
        assert!(fixture.join("main/ci/pipeline.yml").exists());
    }

    #[test]
    fn test_pipelines_are_valid_yaml() {
        let snippets = [
            pipelines::STEPS,
            pipelines::LOCAL_TEMPLATE,
            pipelines::EXTERNAL_TEMPLATE,
            pipelines::PINNED_TO_MISSING_TAG,
            pipelines::UNKNOWN_ALIAS,
        ];
        for snippet in snippets {
            serde_yaml::from_str::<serde_yaml::Value>(snippet).expect("Snippet should be valid YAML");
        }
    }
}
