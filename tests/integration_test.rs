//! Integration tests for complete validation runs through the library API.

#[allow(dead_code)]
mod common;

use common::prelude::*;
use pipeline_refcheck::cache::ValidationCache;
use pipeline_refcheck::config::{self, RepositoryConfiguration, ValidationInput};
use pipeline_refcheck::discovery::{FileDiscovery, Scan};
use pipeline_refcheck::extract::Extractor;
use pipeline_refcheck::phases::{aliases, orchestrator};
use pipeline_refcheck::reference::{Outcome, ValidationResult};
use pipeline_refcheck::validator::Validator;
use pipeline_refcheck::version::{RefKind, VersionRef};
use std::path::Path;

fn run(repositories: Vec<RepositoryConfiguration>) -> ValidationResult {
    orchestrator::execute(
        ValidationInput::Repositories(repositories),
        &Validator::new(),
        &FileDiscovery::new(Scan::Explicit),
    )
    .expect("validation run")
}

fn two_repositories(fixture: &TestFixture) -> Vec<RepositoryConfiguration> {
    vec![
        RepositoryConfiguration::new("main", fixture.join("main")),
        RepositoryConfiguration::new("templates", fixture.join("templates")).with_alias("templates"),
    ]
}

#[test]
fn test_scenario_a_local_reference_exists() {
    let fixture = TestFixture::new()
        .with_file("pipeline.yml", pipelines::LOCAL_TEMPLATE)
        .with_file("build.yml", pipelines::STEPS);

    let result = orchestrator::validate_path(&fixture.join("pipeline.yml")).unwrap();
    assert!(result.is_valid);
    assert_eq!(result.valid_references.len(), 1);
    assert_eq!(result.valid_references[0].reference.target, "build.yml");
}

#[test]
fn test_scenario_b_local_reference_missing() {
    let fixture = TestFixture::new().with_file("pipeline.yml", pipelines::LOCAL_TEMPLATE);

    let result = orchestrator::validate_path(&fixture.join("pipeline.yml")).unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.broken_references.len(), 1);

    let broken = &result.broken_references[0];
    assert_eq!(broken.outcome, Outcome::BrokenPath);
    assert_eq!(
        broken.reference.target,
        fixture.join("build.yml").display().to_string()
    );
}

#[test]
fn test_scenario_c_cross_repository_reference() {
    let fixture = TestFixture::new()
        .with_file("main/pipeline.yml", pipelines::EXTERNAL_TEMPLATE)
        .with_file("templates/build.yml", pipelines::STEPS);

    let result = run(two_repositories(&fixture));
    assert!(result.is_valid, "{:?}", result.broken_references);
    // build.yml in templates has no references of its own
    assert_eq!(result.valid_references.len(), 1);
    assert_eq!(result.diagnostics.repositories_scanned, 2);
}

#[test]
fn test_scenario_d_pinned_tag_missing() {
    let mut fixture = TestFixture::new()
        .with_file("main/pipeline.yml", pipelines::PINNED_TO_MISSING_TAG)
        .with_file("templates/build.yml", pipelines::STEPS);
    if git_available() {
        fixture = fixture.with_git_repo("templates", &["v1.0.0"]);
    }

    let result = run(two_repositories(&fixture));
    assert!(!result.is_valid);
    assert_eq!(result.version_issues.len(), 1);
    assert!(result.broken_references.is_empty());

    let issue = &result.version_issues[0];
    assert_eq!(issue.outcome, Outcome::InvalidVersion);
    assert!(issue.reference.target.contains("v9.9.9"));
    assert!(issue.reference.target.contains("'templates'"));
    // The declaration itself is still reported as valid metadata
    assert!(result
        .valid_references
        .iter()
        .any(|v| v.reference.target == "repository:templates"));
}

#[test]
fn test_scenario_e_unknown_alias() {
    let fixture = TestFixture::new()
        .with_file("main/pipeline.yml", pipelines::UNKNOWN_ALIAS)
        .with_file("templates/build.yml", pipelines::STEPS);

    let result = run(two_repositories(&fixture));
    assert!(!result.is_valid);
    assert_eq!(result.broken_references.len(), 1);
    assert_eq!(result.broken_references[0].outcome, Outcome::MissingRepository);
    assert!(result.broken_references[0].reference.target.contains("unknown"));
}

#[test]
fn test_pinned_tag_present_checks_file_at_tag() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new()
        .with_file("main/pipeline.yml", "steps:\n- template: build.yml@templates\n- template: later.yml@templates\n")
        .with_file("templates/build.yml", pipelines::STEPS)
        .with_git_repo("templates", &["v1.0.0"])
        // Present on disk, absent from the tagged commit
        .with_file("templates/later.yml", pipelines::STEPS);

    let repositories = vec![
        RepositoryConfiguration::new("main", fixture.join("main")),
        RepositoryConfiguration::new("templates", fixture.join("templates")).with_pinned_ref("v1.0.0"),
    ];
    let result = run(repositories);
    assert_eq!(result.valid_references.len(), 1);
    assert_eq!(result.broken_references.len(), 1);
    assert!(result.broken_references[0]
        .reference
        .target
        .ends_with("(at tag 'v1.0.0')"));
}

#[test]
fn test_skipped_repository_is_always_valid() {
    let fixture = TestFixture::new()
        .with_file("main/pipeline.yml", "steps:\n- template: does/not/exist.yml@vendored\n")
        // Never scanned, so its broken reference is never reported
        .with_file("vendored/pipeline.yml", "steps:\n- template: missing.yml\n");

    let repositories = vec![
        RepositoryConfiguration::new("main", fixture.join("main")),
        RepositoryConfiguration::new("vendored", fixture.join("vendored"))
            .with_pinned_ref("refs/tags/never-created")
            .with_skip_validation(true),
    ];
    let result = run(repositories);
    assert!(result.is_valid);
    assert_eq!(result.valid_references.len(), 1);
    assert_eq!(result.diagnostics.repositories_skipped, 1);
}

#[test]
fn test_declaration_version_is_inherited_regardless_of_position() {
    let extractor = Extractor::new().unwrap();
    let declaration = "resources:\n  repositories:\n  - repository: t\n    name: org/t\n    ref: refs/tags/v3.0.0\n";
    let reference = "steps:\n- template: a.yml@t\n";

    for content in [
        format!("{}{}", declaration, reference),
        format!("{}{}", reference, declaration),
    ] {
        let extraction = extractor.extract(Path::new("p.yml"), &content);
        let external: Vec<_> = extraction
            .references
            .iter()
            .filter(|r| r.target_repository() == Some("t"))
            .collect();
        assert_eq!(external.len(), 1);
        assert_eq!(
            external[0].target_version(),
            Some(&VersionRef::new("v3.0.0", RefKind::Tag))
        );
    }
}

#[test]
fn test_alias_discovery_is_idempotent() {
    let fixture = TestFixture::new()
        .with_file(
            "main/pipeline.yml",
            "resources:\n  repositories:\n  - repository: tpl\n    name: org/templates\n  - repository: t2\n    name: templates\n",
        )
        .with_file("templates/build.yml", pipelines::STEPS);
    let repositories = vec![
        RepositoryConfiguration::new("main", fixture.join("main")),
        RepositoryConfiguration::new("templates", fixture.join("templates")),
    ];

    let discovery = FileDiscovery::new(Scan::Explicit);
    let extractor = Extractor::new().unwrap();
    let cache = ValidationCache::new();
    let once = aliases::execute(&repositories, &discovery, &extractor, &cache);
    let twice = aliases::execute(&once, &discovery, &extractor, &cache);

    assert_eq!(once, twice);
    let expected: Vec<&str> = vec!["t2", "tpl"];
    assert_eq!(once[1].aliases.iter().map(String::as_str).collect::<Vec<_>>(), expected);
}

#[test]
fn test_config_file_drives_a_run() {
    let fixture = TestFixture::new()
        .with_file("main/pipeline.yml", pipelines::EXTERNAL_TEMPLATE)
        .with_file("templates/build.yml", pipelines::STEPS)
        .with_config(
            "repositories:\n  - name: main\n    path: main\n  - name: org/templates\n    path: templates\n    aliases: [templates]\n",
        );

    let repositories = config::from_file(fixture.config_path()).unwrap();
    assert_eq!(repositories[1].path, fixture.join("templates"));

    let result = run(repositories);
    assert!(result.is_valid, "{:?}", result.broken_references);
}

#[test]
fn test_unreadable_file_does_not_abort_run() {
    let fixture = TestFixture::new()
        .with_file("repo/pipeline.yml", pipelines::LOCAL_TEMPLATE)
        .with_file("repo/build.yml", pipelines::STEPS)
        .with_binary_file("repo/corrupt.yml", &[0xff, 0xfe, 0xfd]);

    let result = orchestrator::validate_path(&fixture.join("repo")).unwrap();
    assert!(result.is_valid);
    assert_eq!(result.diagnostics.extraction_failures, 1);
    assert_eq!(result.valid_references.len(), 1);
}
