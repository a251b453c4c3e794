//! Orchestrator for a complete validation run
//!
//! This module coordinates all phases to provide a clean API for validating
//! a repository list (or a single path) end to end.

use std::path::Path;

use log::info;

use super::extraction::CollectedReferences;
use super::{phase1, phase2, phase3};
use crate::config::ValidationInput;
use crate::discovery::{FileDiscovery, Scan};
use crate::error::Result;
use crate::extract::Extractor;
use crate::reference::ValidationResult;
use crate::validator::Validator;

/// Execute a complete validation run (Phases 1-3)
///
/// 1. Normalize the input into a repository list
/// 2. Enrich the list with aliases declared in pipeline documents
/// 3. Collect every reference from the non-skipped repositories
/// 4. Validate each reference and bucket the verdicts
///
/// Only input normalization can fail (duplicate repository names). Problems
/// with individual files, repositories or references are reported inside the
/// returned [`ValidationResult`].
pub fn execute(
    input: ValidationInput,
    validator: &Validator,
    discovery: &FileDiscovery,
) -> Result<ValidationResult> {
    let repositories = input.into_repositories()?;
    let extractor = Extractor::new()?;

    // Phase 1: Alias Resolution
    let repositories = phase1::execute(&repositories, discovery, &extractor, validator.cache());

    // Phase 2: Reference Collection
    let collected = phase2::execute(&repositories, discovery, &extractor, validator.cache());

    // Phase 3: Reference Validation
    let outcomes = phase3::execute(&collected.references, &repositories, validator);

    let result = ValidationResult::from_outcomes(outcomes, collected.diagnostics);
    info!(
        "{} references: {} valid, {} broken, {} version issues",
        result.total(),
        result.valid_references.len(),
        result.broken_references.len(),
        result.version_issues.len()
    );
    Ok(result)
}

/// Run Phases 1 and 2 only: every reference, unvalidated.
pub fn collect(
    input: ValidationInput,
    validator: &Validator,
    discovery: &FileDiscovery,
) -> Result<CollectedReferences> {
    let repositories = input.into_repositories()?;
    let extractor = Extractor::new()?;
    let repositories = phase1::execute(&repositories, discovery, &extractor, validator.cache());
    Ok(phase2::execute(&repositories, discovery, &extractor, validator.cache()))
}

/// Validate a single file or directory with default collaborators.
pub fn validate_path(path: &Path) -> Result<ValidationResult> {
    execute(
        ValidationInput::Path(path.to_path_buf()),
        &Validator::new(),
        &FileDiscovery::new(Scan::Explicit),
    )
}
