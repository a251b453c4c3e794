//! # Pipeline Reference Checking Library
//!
//! This library checks that the `template:` and `extends:` references inside
//! pipeline YAML documents point at files that exist, across one or many
//! checked-out repositories and, for cross-repository references, at the
//! pinned revision. It is designed to be used by the `pipeline-refcheck`
//! command-line tool but can also be embedded in other tools, such as a
//! file watcher that re-runs validation on change.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use pipeline_refcheck::extract::Extractor;
//!
//! let extractor = Extractor::new().unwrap();
//! let extraction = extractor.extract(
//!     Path::new("azure-pipelines.yml"),
//!     "resources:\n  repositories:\n  - repository: templates\n    name: org/templates\n    ref: refs/tags/v1.0.0\nsteps:\n- template: build.yml@templates\n",
//! );
//!
//! let reference = &extraction.references[0];
//! assert_eq!(reference.target, "build.yml");
//! assert_eq!(reference.target_repository(), Some("templates"));
//! assert_eq!(reference.target_version().unwrap().version, "v1.0.0");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The repositories taking part in a run,
//!   loaded from `refcheck.yaml` or supplied directly.
//! - **Extraction (`extract`, `version`)**: Repository declarations and
//!   references read from each document, with a structured pass and a
//!   tolerant textual pass.
//! - **Resolution (`path`)**: Where a reference target lives on disk.
//! - **Validation (`validator`, `repository`, `git`, `cache`)**: Read-only
//!   existence checks against working copies and `git`, memoized per run.
//! - **Phases (`phases`)**: Alias resolution, reference collection and
//!   reference validation, driven by `phases::orchestrator`.
//!
//! ## Execution Flow
//!
//! 1.  **Normalization**: A single path becomes a one-repository list.
//! 2.  **Alias Resolution**: Declarations found in documents add aliases to
//!     the repositories they name.
//! 3.  **Collection**: Every reference is extracted from every repository
//!     that is not skipped.
//! 4.  **Validation**: Each reference gets exactly one verdict, and the
//!     verdicts are bucketed into a [`reference::ValidationResult`].
//!
//! Failures below the run level (unreadable files, failing `git` queries,
//! unexpected errors for one reference) are reported in the result rather
//! than aborting the run.

pub mod cache;
pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod git;
pub mod output;
pub mod path;
pub mod phases;
pub mod reference;
pub mod repository;
pub mod suggestions;
pub mod validator;
pub mod version;

#[cfg(test)]
mod version_proptest;
