//! # Refs Command Implementation
//!
//! This module implements the `refs` subcommand, which prints every reference
//! and repository declaration the extractor finds, after alias resolution,
//! without validating any of them. It is the quickest way to see why a
//! reference is (or is not) being picked up.

use anyhow::Result;
use clap::Args;

use pipeline_refcheck::output::{emoji, OutputConfig};
use pipeline_refcheck::phases::orchestrator;
use pipeline_refcheck::reference::{Reference, ReferenceKind};
use pipeline_refcheck::validator::Validator;

use super::InputArgs;

/// List extracted references
#[derive(Args, Debug)]
pub struct RefsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the references as JSON.
    #[arg(long)]
    pub json: bool,
}

fn describe(reference: &Reference) -> String {
    match &reference.kind {
        ReferenceKind::Local => reference.target.clone(),
        ReferenceKind::External {
            repository,
            version: Some(version),
        } => format!("{}@{} ({})", reference.target, repository, version),
        ReferenceKind::External {
            repository,
            version: None,
        } => format!("{}@{}", reference.target, repository),
        ReferenceKind::Declaration {
            alias,
            canonical_name,
            ..
        } => format!("repository {} -> {}", alias, canonical_name),
    }
}

/// Execute the `refs` command.
pub fn execute(args: RefsArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let (input, discovery) = args.input.resolve()?;

    let collected = orchestrator::collect(input, &Validator::new(), &discovery)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&collected.references)?);
        return Ok(());
    }

    for reference in &collected.references {
        let marker = if reference.is_declaration() {
            emoji(&out, "📦", "[DECL]")
        } else {
            emoji(&out, "🔗", "[REF]")
        };
        println!(
            "{} {}:{} {}",
            marker,
            reference.source.display(),
            reference.line_number,
            describe(reference)
        );
    }
    println!(
        "\n{} {} references in {} files",
        emoji(&out, "📊", "[INFO]"),
        collected.references.len(),
        collected.diagnostics.files_scanned
    );
    Ok(())
}
