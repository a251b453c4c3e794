//! # Declaration and Reference Extraction
//!
//! [`Extractor`] pulls two things out of a pipeline document:
//!
//! - **Repository declarations** from `resources.repositories`, read by a
//!   structured YAML pass over every `---`-separated document. When that pass
//!   finds nothing (no section, or the text does not parse), a permissive
//!   line scan looks for `repository:` followed closely by `name:` and an
//!   optional `ref:`.
//! - **References** from `template:`/`extends:` keys, read by a textual
//!   pattern pass that always runs, so a document that fails to parse still
//!   yields its references. Inline values, values nested under `file:`, and
//!   list items are all recognised. A target suffixed with `@alias` is a
//!   cross-repository reference.
//!
//! References are keyed by (source, line, target). Cross-repository matches
//! are applied after local ones and replace them on a key collision. After
//! collection, every cross-repository reference without a version inherits
//! the version of the declaration for its alias, wherever in the text that
//! declaration appears. Declarations are then appended as zero-position
//! marker references.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::debug;
use regex::{Captures, Regex};
use serde::Deserialize;
use serde_yaml::Value;

use crate::cache::ValidationCache;
use crate::defaults::DECLARATION_SCAN_WINDOW;
use crate::error::{Error, Result};
use crate::reference::{Reference, ReferenceKind, RepositoryDeclaration};
use crate::version::parse_ref;

/// Horizontal whitespace, an optional list-item dash, and the reference keys.
const KEY: &str = r"^[ \t]*(?:-[ \t]+)?(?:template|extends)[ \t]*:";
/// A nested `file:` property on the following line.
const NESTED_FILE: &str = r"[ \t]*\r?\n[ \t]*(?:-[ \t]+)?file[ \t]*:";
const TARGET: &str = r##"[ \t]*['"]?(?P<target>[^\s'"#@]+)"##;
const REPOSITORY: &str = r##"@(?P<repo>[^\s'"#@]+)"##;

/// What one document contributed to a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub declarations: Vec<RepositoryDeclaration>,
    /// References in line order, followed by one marker per declaration.
    pub references: Vec<Reference>,
}

/// Compiled extraction patterns.
#[derive(Debug, Clone)]
pub struct Extractor {
    local: Vec<Regex>,
    external: Vec<Regex>,
    declared_repository: Regex,
    declared_name: Regex,
    declared_ref: Regex,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        let inline = format!("(?m){}{}", KEY, TARGET);
        let nested = format!("(?m){}{}{}", KEY, NESTED_FILE, TARGET);
        Ok(Self {
            local: vec![Regex::new(&inline)?, Regex::new(&nested)?],
            external: vec![
                Regex::new(&format!("{}{}", inline, REPOSITORY))?,
                Regex::new(&format!("{}{}", nested, REPOSITORY))?,
            ],
            declared_repository: Regex::new(&field_pattern("repository"))?,
            declared_name: Regex::new(&field_pattern("name"))?,
            declared_ref: Regex::new(&field_pattern("ref"))?,
        })
    }

    /// Read `path` through `cache` and extract from it.
    pub fn extract_file(&self, path: &Path, cache: &ValidationCache) -> Result<Extraction> {
        let content = cache.read_to_string(path).map_err(|e| Error::Extraction {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(self.extract(path, &content))
    }

    /// Extract declarations and references from `content`, found at `source`.
    pub fn extract(&self, source: &Path, content: &str) -> Extraction {
        let mut declarations = structured_declarations(source, content);
        if declarations.is_empty() {
            declarations = self.scan_declarations(content);
        }

        let mut collected = References::default();
        for pattern in &self.local {
            for captures in pattern.captures_iter(content) {
                if let Some(reference) = local_match(source, content, &captures) {
                    collected.insert(reference);
                }
            }
        }
        for pattern in &self.external {
            for captures in pattern.captures_iter(content) {
                if let Some(reference) = external_match(source, content, &captures) {
                    collected.insert(reference);
                }
            }
        }

        let mut references = collected.into_sorted();
        backfill_versions(&mut references, &declarations);

        let mut seen = HashSet::new();
        for declaration in &declarations {
            if seen.insert(declaration.alias.as_str()) {
                references.push(Reference::declaration(source, declaration));
            }
        }

        debug!(
            "{}: {} declarations, {} references",
            source.display(),
            declarations.len(),
            references.len()
        );
        Extraction {
            declarations,
            references,
        }
    }

    /// Recover declarations from text the structured pass could not use.
    fn scan_declarations(&self, content: &str) -> Vec<RepositoryDeclaration> {
        let lines: Vec<&str> = content.lines().collect();
        let mut declarations = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let Some(alias) = capture_value(&self.declared_repository, line) else {
                continue;
            };

            let mut name = None;
            let mut raw_ref = None;
            for following in lines.iter().skip(index + 1).take(DECLARATION_SCAN_WINDOW) {
                if self.declared_repository.is_match(following) {
                    break;
                }
                if name.is_none() {
                    name = capture_value(&self.declared_name, following);
                }
                if raw_ref.is_none() {
                    raw_ref = capture_value(&self.declared_ref, following);
                }
            }

            if let Some(name) = name {
                let version = raw_ref.map(parse_ref);
                declarations.push(RepositoryDeclaration::new(alias, name, version));
            }
        }
        declarations
    }
}

fn field_pattern(key: &str) -> String {
    format!(r##"^[ \t]*(?:-[ \t]+)?{}[ \t]*:[ \t]*['"]?(?P<value>[^\s'"#]+)"##, key)
}

fn capture_value<'t>(pattern: &Regex, line: &'t str) -> Option<&'t str> {
    pattern
        .captures(line)
        .and_then(|captures| captures.name("value"))
        .map(|value| value.as_str())
}

/// Declarations from every parseable document in `content`.
///
/// Parsing stops at the first document that fails; declarations from the
/// documents before it are kept.
fn structured_declarations(source: &Path, content: &str) -> Vec<RepositoryDeclaration> {
    let mut declarations = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = match Value::deserialize(document) {
            Ok(value) => value,
            Err(e) => {
                debug!("Structured parse of {} stopped: {}", source.display(), e);
                break;
            }
        };
        let entries = value
            .get("resources")
            .and_then(|resources| resources.get("repositories"))
            .and_then(Value::as_sequence);
        for entry in entries.into_iter().flatten() {
            if let Some(declaration) = declaration_from(entry) {
                declarations.push(declaration);
            }
        }
    }
    declarations
}

fn declaration_from(entry: &Value) -> Option<RepositoryDeclaration> {
    let name = string_field(entry, "name")?;
    // An entry without an alias declares itself under its own name
    let alias = string_field(entry, "repository").unwrap_or(name);
    let version = string_field(entry, "ref").map(parse_ref);
    Some(RepositoryDeclaration::new(alias, name, version))
}

fn string_field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// References keyed by (source, line, target); later inserts replace earlier ones.
#[derive(Default)]
struct References {
    items: Vec<Reference>,
    index: HashMap<(PathBuf, usize, String), usize>,
}

impl References {
    fn insert(&mut self, reference: Reference) {
        let key = reference.key();
        if let Some(&position) = self.index.get(&key) {
            self.items[position] = reference;
            return;
        }
        self.index.insert(key, self.items.len());
        self.items.push(reference);
    }

    fn into_sorted(self) -> Vec<Reference> {
        let mut items = self.items;
        items.sort_by_key(|reference| reference.line_number);
        items
    }
}

/// The 1-based line number and text of the line containing byte `offset`.
fn line_at(content: &str, offset: usize) -> (usize, &str) {
    let before = &content[..offset];
    let number = before.matches('\n').count() + 1;
    let start = before.rfind('\n').map_or(0, |i| i + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |i| offset + i);
    (number, &content[start..end])
}

/// Whether a captured target can be checked offline.
fn is_resolvable(target: &str) -> bool {
    let starts_well = target
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '.' | '/' | '\\' | '_' | '-'));
    starts_well && !target.contains("${{") && !target.contains("$(")
}

fn local_match(source: &Path, content: &str, captures: &Captures<'_>) -> Option<Reference> {
    let target = captures.name("target")?;
    if !is_resolvable(target.as_str()) {
        return None;
    }
    let (line_number, context) = line_at(content, target.start());
    Some(Reference::local(source, target.as_str(), line_number, context))
}

fn external_match(source: &Path, content: &str, captures: &Captures<'_>) -> Option<Reference> {
    let target = captures.name("target")?;
    let repository = captures.name("repo")?;
    if !is_resolvable(target.as_str()) {
        return None;
    }
    let (line_number, context) = line_at(content, target.start());
    Some(Reference::external(
        source,
        target.as_str(),
        repository.as_str(),
        line_number,
        context,
    ))
}

/// Give unversioned cross-repository references their declaration's version.
fn backfill_versions(references: &mut [Reference], declarations: &[RepositoryDeclaration]) {
    for declaration in declarations {
        let Some(version) = &declaration.version else {
            continue;
        };
        for reference in references.iter_mut() {
            let inherits = matches!(
                &reference.kind,
                ReferenceKind::External { repository, version: None } if *repository == declaration.alias
            );
            if inherits {
                *reference = reference.with_version(version.clone());
            }
        }
    }
}
