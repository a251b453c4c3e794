//! Phase 1: Alias Resolution
//!
//! Pipeline documents bind local aliases to canonical repository names
//! (`repository: templates` / `name: org/templates`). This phase scans every
//! non-skipped repository, resolves each declaration's canonical name to a
//! configured repository, and adds the alias to that repository's alias set.
//!
//! Canonical names are looked up by exact name first and then with their
//! `organization/` prefix stripped, so a repository configured as
//! `templates` still picks up declarations of `org/templates`. Names that
//! resolve to nothing are dropped here; a reference that actually uses such
//! an alias is reported later as a missing repository.
//!
//! The caller's configurations are never modified; enriched copies are
//! returned. Alias sets only grow, so running the phase again on its own
//! output changes nothing.

use std::collections::HashMap;

use log::{debug, warn};

use crate::cache::ValidationCache;
use crate::config::RepositoryConfiguration;
use crate::discovery::FileDiscovery;
use crate::extract::Extractor;

/// The last path segment of an `organization/repository` style name.
pub fn strip_organization(name: &str) -> &str {
    name.rsplit_once('/').map_or(name, |(_, repository)| repository)
}

/// Index repositories by exact name, then by stripped name where that does
/// not collide with an existing key.
pub fn build_lookup(repositories: &[RepositoryConfiguration]) -> HashMap<String, usize> {
    let mut lookup = HashMap::new();
    for (index, repo) in repositories.iter().enumerate() {
        lookup.entry(repo.name.clone()).or_insert(index);
    }
    for (index, repo) in repositories.iter().enumerate() {
        let stripped = strip_organization(&repo.name);
        if stripped != repo.name {
            lookup.entry(stripped.to_string()).or_insert(index);
        }
    }
    lookup
}

/// Execute Phase 1: return copies of `repositories` with discovered aliases added.
pub fn execute(
    repositories: &[RepositoryConfiguration],
    discovery: &FileDiscovery,
    extractor: &Extractor,
    cache: &ValidationCache,
) -> Vec<RepositoryConfiguration> {
    let mut enriched = repositories.to_vec();
    let lookup = build_lookup(repositories);

    for repo in repositories.iter().filter(|repo| !repo.skip_validation) {
        let files = match discovery.discover(&repo.path) {
            Ok(files) => files,
            Err(e) => {
                warn!("Skipping alias discovery in '{}': {}", repo.name, e);
                continue;
            }
        };

        for file in files {
            let extraction = match extractor.extract_file(&file, cache) {
                Ok(extraction) => extraction,
                Err(e) => {
                    debug!("Alias discovery skipped {}: {}", file.display(), e);
                    continue;
                }
            };

            for declaration in extraction.declarations {
                let canonical = declaration.canonical_name.as_str();
                let target = lookup
                    .get(canonical)
                    .or_else(|| lookup.get(strip_organization(canonical)));
                match target {
                    Some(&index) => {
                        let configuration = &mut enriched[index];
                        if configuration.name != declaration.alias
                            && configuration.aliases.insert(declaration.alias.clone())
                        {
                            debug!(
                                "Alias '{}' -> '{}' (declared in {})",
                                declaration.alias,
                                configuration.name,
                                file.display()
                            );
                        }
                    }
                    None => debug!(
                        "Declaration of '{}' in {} matches no configured repository",
                        canonical,
                        file.display()
                    ),
                }
            }
        }
    }

    enriched
}
