//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

/// Generate an error for when the repository-list file is not found.
///
/// Includes hints about:
/// - Creating a repository list
/// - Using the -c/--config flag
/// - Using the REFCHECK_CONFIG environment variable
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a refcheck.yaml listing your repositories under 'repositories:'\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set REFCHECK_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for an invalid glob pattern.
///
/// Includes hints about glob syntax.
pub fn invalid_glob(pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid glob pattern: {pattern}\n\
         error: {error}\n\n\
         hint: Use * for single path component, ** for recursive matching\n\
         hint: Use [abc] for character classes, [!abc] to negate\n\
         hint: Escape special characters with backslash"
    )
}

/// Generate an error for a `--discover` directory with no working copies.
pub fn no_repositories_found(root: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "No repositories found beneath {root}\n\n\
         hint: --discover looks for directories containing a .git entry\n\
         hint: Use --repo NAME=PATH to add a repository explicitly",
        root = root.display()
    )
}

/// Generate the error a failed validation run exits with.
pub fn validation_failed(broken: usize, version_issues: usize) -> anyhow::Error {
    anyhow::anyhow!(
        "Validation failed: {broken} broken reference(s), {version_issues} version issue(s)\n\n\
         hint: Run 'pipeline-refcheck refs' to list every extracted reference\n\
         hint: Set skipValidation: true on repositories that cannot be checked out"
    )
}

/// A "did you mean" suffix for an alias no repository answers to.
///
/// Empty when no configured name or alias is close enough.
pub fn unknown_repository_hint(alias: &str, candidates: &[&str]) -> String {
    find_similar(alias, candidates)
        .map(|s| format!("; did you mean '{s}'?"))
        .unwrap_or_default()
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut previous: Vec<usize> = (0..=b_len).collect();
    let mut current = vec![0usize; b_len + 1];

    for i in 1..=a_len {
        current[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_len]
}
