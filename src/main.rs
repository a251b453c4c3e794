//! # Pipeline Reference Checker CLI
//!
//! This is the binary entry point for the `pipeline-refcheck` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Mapping the outcome to an exit status: 0 when every reference is valid,
//!   1 when validation fails or an error occurs, 2 for usage errors.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
