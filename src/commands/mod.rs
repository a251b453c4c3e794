//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `pipeline-refcheck` command-line tool. Each subcommand is defined in its own
//! file to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! Commands that read pipelines share [`InputArgs`], which decides what a run
//! checks. In priority order: the repositories given with `--config`, `--repo`
//! and `--discover`; the `PATH` argument; `./refcheck.yaml` when it exists;
//! otherwise the current directory, scanned with the default exclusions.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use pipeline_refcheck::config::{self, RepositoryConfiguration, ValidationInput};
use pipeline_refcheck::defaults::{DEFAULT_CONFIG_FILENAME, REPOSITORY_DISCOVERY_DEPTH};
use pipeline_refcheck::discovery::{discover_repositories, FileDiscovery, Scan};
use pipeline_refcheck::suggestions;

pub mod completions;
pub mod refs;
pub mod validate;

/// What to check
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// A pipeline file or directory to check as a single repository.
    #[arg(value_name = "PATH", conflicts_with_all = ["config", "repos", "discover"])]
    pub path: Option<PathBuf>,

    /// Repository-list file (YAML, or TOML when it ends in .toml).
    ///
    /// Can also be set with the `REFCHECK_CONFIG` environment variable.
    #[arg(short, long, value_name = "FILE", env = "REFCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Add a repository as NAME=PATH or NAME=PATH@REF (repeatable).
    #[arg(long = "repo", value_name = "NAME=PATH[@REF]")]
    pub repos: Vec<String>,

    /// Add every working copy found beneath DIR.
    #[arg(long, value_name = "DIR")]
    pub discover: Option<PathBuf>,

    /// Leave out files whose root-relative path matches PATTERN (repeatable).
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

impl InputArgs {
    /// Decide the run's input and how its roots are scanned.
    pub fn resolve(&self) -> Result<(ValidationInput, FileDiscovery)> {
        let (input, scan) = self.select_input()?;
        for pattern in &self.exclude {
            glob::Pattern::new(pattern).map_err(|e| suggestions::invalid_glob(pattern, &e))?;
        }
        let discovery = FileDiscovery::new(scan).with_exclude_patterns(&self.exclude)?;
        Ok((input, discovery))
    }

    fn select_input(&self) -> Result<(ValidationInput, Scan)> {
        let mut repositories = Vec::new();
        let mut listed = false;

        if let Some(config_path) = &self.config {
            repositories.extend(load_config(config_path)?);
            listed = true;
        }
        for spec in &self.repos {
            repositories.push(config::parse_repository_spec(spec)?);
            listed = true;
        }
        if let Some(root) = &self.discover {
            let found = discover_repositories(root, REPOSITORY_DISCOVERY_DEPTH)?;
            if found.is_empty() {
                return Err(suggestions::no_repositories_found(root));
            }
            repositories.extend(found);
            listed = true;
        }
        if listed {
            return Ok((ValidationInput::Repositories(repositories), Scan::Explicit));
        }

        if let Some(path) = &self.path {
            return Ok((ValidationInput::Path(path.clone()), Scan::Explicit));
        }

        let default_config = Path::new(DEFAULT_CONFIG_FILENAME);
        if default_config.is_file() {
            return Ok((
                ValidationInput::Repositories(load_config(default_config)?),
                Scan::Explicit,
            ));
        }

        Ok((ValidationInput::Path(PathBuf::from(".")), Scan::Implicit))
    }
}

fn load_config(path: &Path) -> Result<Vec<RepositoryConfiguration>> {
    if !path.exists() {
        return Err(suggestions::config_not_found(path));
    }
    Ok(config::from_file(path)?)
}
