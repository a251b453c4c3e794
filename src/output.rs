//! # Output Configuration and Reports
//!
//! This module provides utilities for controlling CLI output appearance,
//! including color and emoji support based on terminal capabilities and
//! user preferences, and renders a [`ValidationResult`] as a console report,
//! a markdown document or JSON.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pipeline_refcheck::output::{render, OutputConfig, ReportFormat};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! print!("{}", render(&result, ReportFormat::Console, &config)?);
//! ```
//!
//! Rendering never prints or writes; callers decide where the text goes.

use std::env;
use std::fmt::Write as _;

use console::{style, Color};

use crate::error::{Error, Result};
use crate::reference::{Outcome, ValidatedReference, ValidationResult};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the appropriate string based on color configuration.
///
/// When colors are enabled, returns the emoji. When disabled, returns
/// the plain text alternative.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

fn paint(config: &OutputConfig, text: &str, color: Color) -> String {
    if config.use_color {
        style(text).fg(color).force_styling(true).to_string()
    } else {
        text.to_string()
    }
}

/// Report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Console,
    Markdown,
    Json,
}

/// Render `result` in `format`.
pub fn render(result: &ValidationResult, format: ReportFormat, config: &OutputConfig) -> Result<String> {
    match format {
        ReportFormat::Console => Ok(render_console(result, config)),
        ReportFormat::Markdown => Ok(render_markdown(result)),
        ReportFormat::Json => render_json(result),
    }
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Valid => "valid",
        Outcome::BrokenPath => "broken path",
        Outcome::MissingRepository => "missing repository",
        Outcome::InvalidVersion => "invalid version",
    }
}

fn location(validated: &ValidatedReference) -> String {
    let reference = &validated.reference;
    if reference.line_number == 0 {
        reference.source.display().to_string()
    } else {
        format!("{}:{}", reference.source.display(), reference.line_number)
    }
}

/// A terminal report: failures in detail, then a summary.
pub fn render_console(result: &ValidationResult, config: &OutputConfig) -> String {
    let mut out = String::new();

    if !result.broken_references.is_empty() {
        let _ = writeln!(
            out,
            "{} Broken references ({}):",
            emoji(config, "❌", "[ERR]"),
            result.broken_references.len()
        );
        for validated in &result.broken_references {
            let _ = writeln!(
                out,
                "   {} {} [{}]",
                paint(config, &location(validated), Color::Cyan),
                paint(config, &validated.reference.target, Color::Red),
                outcome_label(validated.outcome)
            );
        }
        out.push('\n');
    }

    if !result.version_issues.is_empty() {
        let _ = writeln!(
            out,
            "{} Version issues ({}):",
            emoji(config, "⚠️", "[WARN]"),
            result.version_issues.len()
        );
        for validated in &result.version_issues {
            let _ = writeln!(
                out,
                "   {} {}",
                paint(config, &location(validated), Color::Cyan),
                paint(config, &validated.reference.target, Color::Yellow)
            );
        }
        out.push('\n');
    }

    let diagnostics = &result.diagnostics;
    let _ = writeln!(out, "{} Summary:", emoji(config, "📊", "[INFO]"));
    let _ = writeln!(out, "   Repositories scanned: {}", diagnostics.repositories_scanned);
    if diagnostics.repositories_skipped > 0 {
        let _ = writeln!(out, "   Repositories skipped: {}", diagnostics.repositories_skipped);
    }
    let _ = writeln!(out, "   Files scanned: {}", diagnostics.files_scanned);
    if diagnostics.extraction_failures > 0 {
        let _ = writeln!(out, "   Unreadable inputs: {}", diagnostics.extraction_failures);
    }
    let _ = writeln!(out, "   Valid references: {}", result.valid_references.len());
    let _ = writeln!(out, "   Broken references: {}", result.broken_references.len());
    let _ = writeln!(out, "   Version issues: {}", result.version_issues.len());

    if result.is_valid {
        let _ = writeln!(
            out,
            "\n{} {}",
            emoji(config, "✅", "[OK]"),
            paint(config, "All references are valid", Color::Green)
        );
    } else {
        let _ = writeln!(
            out,
            "\n{} {}",
            emoji(config, "❌", "[ERR]"),
            paint(config, "Validation failed", Color::Red)
        );
    }
    out
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn markdown_table(out: &mut String, title: &str, entries: &[ValidatedReference]) {
    let _ = writeln!(out, "## {} ({})\n", title, entries.len());
    if entries.is_empty() {
        out.push_str("None.\n\n");
        return;
    }
    out.push_str("| Source | Line | Target | Outcome |\n");
    out.push_str("|---|---|---|---|\n");
    for validated in entries {
        let reference = &validated.reference;
        let line = if reference.line_number == 0 {
            "-".to_string()
        } else {
            reference.line_number.to_string()
        };
        let _ = writeln!(
            out,
            "| {} | {} | `{}` | {} |",
            escape_cell(&reference.source.display().to_string()),
            line,
            escape_cell(&reference.target),
            outcome_label(validated.outcome)
        );
    }
    out.push('\n');
}

/// A markdown document with one table per bucket.
pub fn render_markdown(result: &ValidationResult) -> String {
    let mut out = String::from("# Pipeline Reference Report\n\n");
    let status = if result.is_valid { "passed" } else { "failed" };
    let _ = writeln!(
        out,
        "**Status:** {} ({} references in {} files)\n",
        status,
        result.total(),
        result.diagnostics.files_scanned
    );
    markdown_table(&mut out, "Broken references", &result.broken_references);
    markdown_table(&mut out, "Version issues", &result.version_issues);
    markdown_table(&mut out, "Valid references", &result.valid_references);
    out
}

/// The whole result as pretty-printed JSON.
pub fn render_json(result: &ValidationResult) -> Result<String> {
    serde_json::to_string_pretty(result).map_err(|e| Error::Serialization {
        message: e.to_string(),
    })
}
