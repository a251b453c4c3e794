//! # File and Repository Discovery
//!
//! Finds the pipeline documents beneath a repository root, and optionally the
//! repositories beneath a workspace directory.
//!
//! Pipeline documents are files ending in `.yml` or `.yaml`. Results are
//! sorted by file name at every level, so the enumeration order (and with it
//! the order of references in a report) is deterministic.
//!
//! Version-control internals and build-output directories are skipped only
//! when scanning from an implicit root ([`Scan::Implicit`]); a directory the
//! caller names explicitly is scanned in full. User-supplied exclusion globs
//! apply in both cases and are matched against root-relative paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::RepositoryConfiguration;
use crate::defaults::DEFAULT_EXCLUDED_DIRS;
use crate::error::{Error, Result};

/// How the root of a scan was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scan {
    /// The root was defaulted (e.g. the current directory).
    Implicit,
    /// The caller named the root.
    #[default]
    Explicit,
}

/// Whether a path looks like a pipeline document.
pub fn is_pipeline_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}

/// Enumerates pipeline documents beneath a root.
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    scan: Scan,
    exclude: Vec<Pattern>,
}

impl FileDiscovery {
    pub fn new(scan: Scan) -> Self {
        Self {
            scan,
            exclude: Vec::new(),
        }
    }

    /// Add glob patterns for root-relative paths to leave out.
    pub fn with_exclude_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self.exclude.push(Pattern::new(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// All pipeline documents beneath `root`, or `root` itself when it is a file.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }
        if !root.is_dir() {
            return Err(Error::Discovery {
                path: root.display().to_string(),
                message: "not a file or directory".to_string(),
            });
        }

        let skip_defaults = self.scan == Scan::Implicit;
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(skip_defaults && is_default_excluded(entry)));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry below {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_pipeline_file(entry.path()) {
                continue;
            }
            if self.is_user_excluded(root, entry.path()) {
                debug!("Excluded by pattern: {}", entry.path().display());
                continue;
            }
            files.push(entry.into_path());
        }

        debug!("Discovered {} pipeline files in {}", files.len(), root.display());
        Ok(files)
    }

    fn is_user_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| pattern.matches(&relative))
    }
}

fn is_default_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| DEFAULT_EXCLUDED_DIRS.contains(&name))
}

/// Find working copies (directories containing a `.git` entry) beneath `root`.
///
/// Each repository is named after its directory; when two directories share a
/// name, the later one is named by its root-relative path instead. Nested
/// repositories below a discovered one are not reported.
pub fn discover_repositories(root: &Path, max_depth: usize) -> Result<Vec<RepositoryConfiguration>> {
    if !root.is_dir() {
        return Err(Error::Discovery {
            path: root.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut repositories = Vec::new();
    let mut names = HashSet::new();
    let mut walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry below {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name() == ".git" {
            walker.skip_current_dir();
            continue;
        }
        if !entry.path().join(".git").exists() {
            continue;
        }

        let mut name = entry
            .file_name()
            .to_str()
            .map(str::to_string)
            .unwrap_or_else(|| entry.path().display().to_string());
        if !names.insert(name.clone()) {
            name = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            names.insert(name.clone());
        }

        debug!("Discovered repository {} at {}", name, entry.path().display());
        repositories.push(RepositoryConfiguration::new(name, entry.path()));
        walker.skip_current_dir();
    }

    Ok(repositories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "steps: []\n").unwrap();
    }

    #[test]
    fn test_is_pipeline_file() {
        assert!(is_pipeline_file(Path::new("a/pipeline.yml")));
        assert!(is_pipeline_file(Path::new("b.YAML")));
        assert!(!is_pipeline_file(Path::new("README.md")));
        assert!(!is_pipeline_file(Path::new("yml")));
    }

    #[test]
    fn test_discover_sorted_yaml_only() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "z.yml");
        touch(temp.path(), "a.yaml");
        touch(temp.path(), "templates/build.yml");
        touch(temp.path(), "notes.txt");

        let files = FileDiscovery::new(Scan::Explicit).discover(temp.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(relative, vec!["a.yaml", "templates/build.yml", "z.yml"]);
    }

    #[test]
    fn test_implicit_scan_skips_default_directories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pipeline.yml");
        touch(temp.path(), ".git/config.yml");
        touch(temp.path(), "target/out.yml");
        touch(temp.path(), "node_modules/pkg/ci.yml");

        let implicit = FileDiscovery::new(Scan::Implicit).discover(temp.path()).unwrap();
        assert_eq!(implicit, vec![temp.path().join("pipeline.yml")]);

        let explicit = FileDiscovery::new(Scan::Explicit).discover(temp.path()).unwrap();
        assert_eq!(explicit.len(), 4);
    }

    #[test]
    fn test_user_exclusion_patterns() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pipeline.yml");
        touch(temp.path(), "fixtures/bad.yml");

        let files = FileDiscovery::new(Scan::Explicit)
            .with_exclude_patterns(&["fixtures/**"])
            .unwrap()
            .discover(temp.path())
            .unwrap();
        assert_eq!(files, vec![temp.path().join("pipeline.yml")]);
    }

    #[test]
    fn test_invalid_exclusion_pattern() {
        let result = FileDiscovery::new(Scan::Explicit).with_exclude_patterns(&["[unclosed"]);
        assert!(matches!(result, Err(Error::Glob(_))));
    }

    #[test]
    fn test_file_root_is_returned_as_is() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pipeline.yml");
        let file = temp.path().join("pipeline.yml");

        let files = FileDiscovery::default().discover(&file).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = FileDiscovery::default().discover(&temp.path().join("absent"));
        assert!(matches!(result, Err(Error::Discovery { .. })));
    }

    #[test]
    fn test_discover_repositories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("main/.git")).unwrap();
        fs::create_dir_all(temp.path().join("main/nested/.git")).unwrap();
        fs::create_dir_all(temp.path().join("group/templates/.git")).unwrap();
        fs::create_dir_all(temp.path().join("plain")).unwrap();

        let repos = discover_repositories(temp.path(), 3).unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["templates", "main"]);
        assert_eq!(repos[1].path, temp.path().join("main"));
    }

    #[test]
    fn test_discover_repositories_disambiguates_names() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/tools/.git")).unwrap();
        fs::create_dir_all(temp.path().join("b/tools/.git")).unwrap();

        let repos = discover_repositories(temp.path(), 3).unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["tools", "b/tools"]);
    }
}
