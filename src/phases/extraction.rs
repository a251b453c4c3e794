//! Phase 2: Reference Collection
//!
//! Runs the extractor over every pipeline document of every non-skipped
//! repository and concatenates the results in discovery order. A repository
//! whose root cannot be enumerated, or a file that cannot be read, is logged,
//! counted in [`RunDiagnostics`] and skipped.

use log::{debug, warn};

use crate::cache::ValidationCache;
use crate::config::RepositoryConfiguration;
use crate::discovery::FileDiscovery;
use crate::extract::Extractor;
use crate::reference::{Reference, RunDiagnostics};

/// Every reference found in a run, with the counters gathered on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedReferences {
    pub references: Vec<Reference>,
    pub diagnostics: RunDiagnostics,
}

/// Execute Phase 2: collect references from every non-skipped repository.
pub fn execute(
    repositories: &[RepositoryConfiguration],
    discovery: &FileDiscovery,
    extractor: &Extractor,
    cache: &ValidationCache,
) -> CollectedReferences {
    let mut collected = CollectedReferences::default();

    for repo in repositories {
        if repo.skip_validation {
            debug!("Not scanning '{}': validation skipped", repo.name);
            collected.diagnostics.repositories_skipped += 1;
            continue;
        }

        let files = match discovery.discover(&repo.path) {
            Ok(files) => files,
            Err(e) => {
                warn!("Skipping repository '{}': {}", repo.name, e);
                collected.diagnostics.extraction_failures += 1;
                continue;
            }
        };
        collected.diagnostics.repositories_scanned += 1;

        for file in files {
            collected.diagnostics.files_scanned += 1;
            match extractor.extract_file(&file, cache) {
                Ok(extraction) => collected.references.extend(extraction.references),
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    collected.diagnostics.extraction_failures += 1;
                }
            }
        }
    }

    debug!(
        "Collected {} references from {} files",
        collected.references.len(),
        collected.diagnostics.files_scanned
    );
    collected
}
