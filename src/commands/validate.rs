//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks every
//! `template:`/`extends:` reference in the selected repositories and reports
//! the ones that do not resolve.
//!
//! ## Functionality
//!
//! - **Reference Validation**: Local references must exist beside (or beneath
//!   the working-copy root of) their document; cross-repository references
//!   must name a configured repository, a revision that exists in it, and a
//!   file present at that revision.
//! - **Reports**: Console (default), markdown or JSON, printed or written to
//!   `--output`.
//! - **Exit Status**: 0 when every reference is valid, 1 otherwise.
//!
//! This command is a safe, read-only operation that does not modify any
//! repository.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use pipeline_refcheck::output::{emoji, render, OutputConfig, ReportFormat};
use pipeline_refcheck::phases::orchestrator;
use pipeline_refcheck::suggestions;
use pipeline_refcheck::validator::Validator;

use super::InputArgs;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable terminal report
    Console,
    /// Markdown tables, one per result bucket
    Markdown,
    /// The full result as JSON
    Json,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Console => ReportFormat::Console,
            Format::Markdown => ReportFormat::Markdown,
            Format::Json => ReportFormat::Json,
        }
    }
}

/// Validate pipeline references
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report format.
    #[arg(short, long, value_enum, default_value = "console")]
    pub format: Format,

    /// Write the report to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let (input, discovery) = args.input.resolve()?;

    let validator = Validator::new();
    let result = orchestrator::execute(input, &validator, &discovery)?;

    match &args.output {
        Some(path) => {
            let report = render(&result, args.format.into(), &OutputConfig::without_color())?;
            std::fs::write(path, report)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!(
                "{} Report written to {}",
                emoji(&out, "📝", "[INFO]"),
                path.display()
            );
        }
        None => print!("{}", render(&result, args.format.into(), &out)?),
    }

    if result.is_valid {
        Ok(())
    } else {
        Err(suggestions::validation_failed(
            result.broken_references.len(),
            result.version_issues.len(),
        ))
    }
}
