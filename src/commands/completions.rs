//! # Completions Command Implementation
//!
//! Prints a shell completion script for `pipeline-refcheck`, generated by
//! `clap_complete` from the same definitions the parser uses.
//!
//! ```bash
//! pipeline-refcheck completions bash > ~/.local/share/bash-completion/completions/pipeline-refcheck
//! pipeline-refcheck completions zsh > ~/.zfunc/_pipeline-refcheck
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
