//! # Error Handling
//!
//! This module defines the centralized error type for `pipeline-refcheck`.
//! It uses the `thiserror` library to create an `Error` enum that covers the
//! failure modes of the validation engine, with contextual fields so that a
//! message is useful when it ends up embedded in a report entry.
//!
//! Most of these errors never escape the orchestrator: a failure while
//! evaluating a single reference is folded into a `BrokenPath` entry, and a
//! failure while extracting a file or repository is counted and skipped. The
//! enum is still the return type of every fallible library function so that
//! callers using the lower-level building blocks directly can propagate with
//! `?`.

use std::time::Duration;

use thiserror::Error;

/// Main error type for pipeline-refcheck operations
#[derive(Error, Debug)]
pub enum Error {
    /// The repository list could not be parsed or is inconsistent.
    ///
    /// Includes an optional hint about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A `git` command could not be run or exited unsuccessfully.
    #[error("Git command failed in {repo}: {command} - {stderr}")]
    GitCommand {
        command: String,
        repo: String,
        stderr: String,
    },

    /// A bounded subprocess call did not finish in time.
    #[error("Command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    /// A pipeline file could not be read or scanned.
    #[error("Extraction error in {path}: {message}")]
    Extraction { path: String, message: String },

    /// File or repository discovery failed below a root directory.
    #[error("Discovery error in {path}: {message}")]
    Discovery { path: String, message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// A report could not be serialized.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
