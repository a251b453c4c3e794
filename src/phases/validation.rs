//! Phase 3: Reference Validation
//!
//! Each reference moves from unvalidated to exactly one [`Outcome`]:
//!
//! - declaration markers are always valid;
//! - local references are resolved against their source and checked on disk;
//! - cross-repository references are checked against the target repository:
//!   an unknown alias is a missing repository, a skipped repository accepts
//!   everything, a pinned revision that does not exist is a version issue,
//!   and otherwise the file must exist at that revision (or on disk).
//!
//! [`ReferenceEvaluator::evaluate`] returns a `Result`; [`into_verdict`] folds
//! an `Err` into a broken-path verdict carrying the error text, so one bad
//! reference never stops the run.

use log::{debug, warn};

use crate::config::{find_repository, RepositoryConfiguration};
use crate::error::Result;
use crate::path::{resolve, repository_relative};
use crate::reference::{Outcome, Reference, ReferenceKind, ValidatedReference};
use crate::suggestions::unknown_repository_hint;
use crate::validator::{effective_version, Validator};

/// Evaluates references against one run's repositories.
pub struct ReferenceEvaluator<'a> {
    repositories: &'a [RepositoryConfiguration],
    validator: &'a Validator,
}

impl<'a> ReferenceEvaluator<'a> {
    pub fn new(repositories: &'a [RepositoryConfiguration], validator: &'a Validator) -> Self {
        Self {
            repositories,
            validator,
        }
    }

    /// Decide the outcome for one reference.
    pub fn evaluate(&self, reference: &Reference) -> Result<ValidatedReference> {
        match &reference.kind {
            ReferenceKind::Declaration { .. } => Ok(valid(reference)),
            ReferenceKind::Local => self.evaluate_local(reference),
            ReferenceKind::External { repository, .. } => {
                self.evaluate_external(reference, repository)
            }
        }
    }

    /// Like [`Self::evaluate`], with errors folded into the verdict.
    pub fn evaluate_or_broken(&self, reference: &Reference) -> ValidatedReference {
        into_verdict(reference, self.evaluate(reference))
    }

    fn evaluate_local(&self, reference: &Reference) -> Result<ValidatedReference> {
        let resolved = resolve(
            &reference.source,
            &reference.target,
            None,
            self.repositories,
            self.validator,
        );
        let exists = match resolved.as_path() {
            Some(path) => self.validator.file_exists(path)?,
            None => false,
        };
        if exists {
            return Ok(valid(reference));
        }
        Ok(ValidatedReference::new(
            reference.with_target(resolved.to_string()),
            Outcome::BrokenPath,
        ))
    }

    fn evaluate_external(&self, reference: &Reference, alias: &str) -> Result<ValidatedReference> {
        let Some(repo) = find_repository(self.repositories, alias) else {
            let hint = unknown_repository_hint(alias, &self.known_names());
            let target = format!(
                "{}@{} (repository '{}' is not configured{})",
                reference.target, alias, alias, hint
            );
            return Ok(ValidatedReference::new(
                reference.with_target(target),
                Outcome::MissingRepository,
            ));
        };

        if repo.skip_validation {
            debug!("Accepting {}@{}: validation skipped", reference.target, alias);
            return Ok(valid(reference));
        }

        let version = effective_version(reference, repo);
        if let Some(version) = &version {
            if !self.validator.ref_exists(&repo.path, version)? {
                let target = format!(
                    "{}@{} (invalid {} in repository '{}')",
                    reference.target, alias, version, repo.name
                );
                return Ok(ValidatedReference::new(
                    reference.with_target(target),
                    Outcome::InvalidVersion,
                ));
            }
        }

        let relative = repository_relative(&reference.target);
        if self
            .validator
            .file_exists_at_ref(&repo.path, &relative, version.as_ref())?
        {
            return Ok(valid(reference));
        }

        let resolved = resolve(
            &reference.source,
            &reference.target,
            Some(alias),
            self.repositories,
            self.validator,
        );
        let target = match &version {
            Some(version) => format!("{} (at {})", resolved, version),
            None => resolved.to_string(),
        };
        Ok(ValidatedReference::new(
            reference.with_target(target),
            Outcome::BrokenPath,
        ))
    }

    fn known_names(&self) -> Vec<&str> {
        self.repositories
            .iter()
            .flat_map(|repo| {
                std::iter::once(repo.name.as_str()).chain(repo.aliases.iter().map(String::as_str))
            })
            .collect()
    }
}

fn valid(reference: &Reference) -> ValidatedReference {
    ValidatedReference::new(reference.clone(), Outcome::Valid)
}

/// Fold an evaluation result into a verdict; errors become broken paths.
pub fn into_verdict(reference: &Reference, result: Result<ValidatedReference>) -> ValidatedReference {
    match result {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(
                "{}:{}: could not validate '{}': {}",
                reference.source.display(),
                reference.line_number,
                reference.target,
                e
            );
            let target = format!("{} (error: {})", reference.target, e);
            ValidatedReference::new(reference.with_target(target), Outcome::BrokenPath)
        }
    }
}

/// Execute Phase 3: one verdict per reference, in order.
pub fn execute(
    references: &[Reference],
    repositories: &[RepositoryConfiguration],
    validator: &Validator,
) -> Vec<ValidatedReference> {
    let evaluator = ReferenceEvaluator::new(repositories, validator);
    references
        .iter()
        .map(|reference| evaluator.evaluate_or_broken(reference))
        .collect()
}
