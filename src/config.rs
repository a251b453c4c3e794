//! # Repository Configuration
//!
//! This module defines [`RepositoryConfiguration`], the caller-supplied
//! description of a checked-out repository, and the logic for loading a list
//! of them from a repository-list file.
//!
//! ## File format
//!
//! The list is read from YAML (default, `refcheck.yaml`) or TOML (any file
//! ending in `.toml`). Two YAML shapes are accepted: the documented shape with
//! a top-level `repositories:` key, and a bare sequence of entries. The parser
//! tries the documented shape first and falls back to the bare sequence.
//!
//! ```yaml
//! repositories:
//!   - name: main
//!     path: ./main
//!   - name: org/templates
//!     path: ../templates
//!     aliases: [templates]
//!     ref: refs/tags/v2.1.0
//!   - name: vendored
//!     path: ./vendor/pipelines
//!     skipValidation: true
//! ```
//!
//! Relative `path` values are resolved against the directory containing the
//! file. Repository names must be unique.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::SYNTHETIC_REPOSITORY_NAME;
use crate::error::{Error, Result};

/// A checked-out repository taking part in a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfiguration {
    /// Unique name; usually the canonical `organization/repository` form.
    pub name: String,
    /// Root of the working copy.
    pub path: PathBuf,
    /// Additional names references may use for this repository.
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    /// Revision cross-repository references are checked against when they do
    /// not state their own.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub pinned_ref: Option<String>,
    /// Accept every reference into this repository without checking it, and
    /// do not scan it.
    #[serde(default, rename = "skipValidation", alias = "skip_validation")]
    pub skip_validation: bool,
}

impl RepositoryConfiguration {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            aliases: BTreeSet::new(),
            pinned_ref: None,
            skip_validation: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    pub fn with_pinned_ref(mut self, pinned_ref: impl Into<String>) -> Self {
        self.pinned_ref = Some(pinned_ref.into());
        self
    }

    pub fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    /// Whether `alias` names this repository, by exact name or by alias.
    pub fn answers_to(&self, alias: &str) -> bool {
        self.name == alias || self.aliases.contains(alias)
    }
}

/// Look up a repository by exact name first, then by alias.
pub fn find_repository<'a>(
    repositories: &'a [RepositoryConfiguration],
    alias: &str,
) -> Option<&'a RepositoryConfiguration> {
    repositories
        .iter()
        .find(|repo| repo.name == alias)
        .or_else(|| repositories.iter().find(|repo| repo.answers_to(alias)))
}

/// What a validation run was asked to check.
#[derive(Debug, Clone)]
pub enum ValidationInput {
    /// A single file or directory, treated as one synthetic repository.
    Path(PathBuf),
    /// An explicit repository list.
    Repositories(Vec<RepositoryConfiguration>),
}

impl ValidationInput {
    /// Normalize the input into a repository list.
    pub fn into_repositories(self) -> Result<Vec<RepositoryConfiguration>> {
        match self {
            ValidationInput::Path(path) => Ok(vec![RepositoryConfiguration::new(
                SYNTHETIC_REPOSITORY_NAME,
                path,
            )]),
            ValidationInput::Repositories(repositories) => {
                ensure_unique_names(&repositories)?;
                Ok(repositories)
            }
        }
    }
}

impl From<PathBuf> for ValidationInput {
    fn from(path: PathBuf) -> Self {
        ValidationInput::Path(path)
    }
}

impl From<Vec<RepositoryConfiguration>> for ValidationInput {
    fn from(repositories: Vec<RepositoryConfiguration>) -> Self {
        ValidationInput::Repositories(repositories)
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryList {
    repositories: Vec<RepositoryConfiguration>,
}

/// Parse a YAML repository list.
pub fn parse_yaml(content: &str) -> Result<Vec<RepositoryConfiguration>> {
    match serde_yaml::from_str::<RepositoryList>(content) {
        Ok(list) => Ok(list.repositories),
        Err(e) => {
            // Only a bare sequence of entries gets the second shape
            let shape = serde_yaml::from_str::<serde_yaml::Value>(content);
            if matches!(shape, Ok(serde_yaml::Value::Sequence(_))) {
                serde_yaml::from_str::<Vec<RepositoryConfiguration>>(content).map_err(Error::Yaml)
            } else {
                Err(Error::Yaml(e))
            }
        }
    }
}

/// Parse a TOML repository list (`[[repositories]]` tables).
pub fn parse_toml(content: &str) -> Result<Vec<RepositoryConfiguration>> {
    let list: RepositoryList = toml::from_str(content)?;
    Ok(list.repositories)
}

/// Load a repository list from a file, resolving relative paths against the
/// file's directory.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<RepositoryConfiguration>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let mut repositories = if is_toml {
        parse_toml(&content)?
    } else {
        parse_yaml(&content)?
    };

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for repo in &mut repositories {
        if repo.path.is_relative() {
            repo.path = base.join(&repo.path);
        }
    }

    ensure_unique_names(&repositories)?;
    Ok(repositories)
}

/// Reject lists in which two entries share a name.
pub fn ensure_unique_names(repositories: &[RepositoryConfiguration]) -> Result<()> {
    let mut seen = HashSet::new();
    for repo in repositories {
        if !seen.insert(repo.name.as_str()) {
            return Err(Error::ConfigParse {
                message: format!("Duplicate repository name '{}'", repo.name),
                hint: Some("Use 'aliases:' to give one repository several names".to_string()),
            });
        }
    }
    Ok(())
}

/// Parse a `NAME=PATH[@REF]` command-line repository specification.
pub fn parse_repository_spec(spec: &str) -> Result<RepositoryConfiguration> {
    let (name, rest) = spec.split_once('=').ok_or_else(|| Error::ConfigParse {
        message: format!("Invalid repository specification '{}'", spec),
        hint: Some("Use NAME=PATH or NAME=PATH@REF".to_string()),
    })?;
    if name.is_empty() || rest.is_empty() {
        return Err(Error::ConfigParse {
            message: format!("Invalid repository specification '{}'", spec),
            hint: Some("Both NAME and PATH must be non-empty".to_string()),
        });
    }

    let repo = match rest.rsplit_once('@') {
        Some((path, pinned_ref)) if !path.is_empty() && !pinned_ref.is_empty() => {
            RepositoryConfiguration::new(name, path).with_pinned_ref(pinned_ref)
        }
        _ => RepositoryConfiguration::new(name, rest),
    };
    Ok(repo)
}
