//! Shell completion scripts.

use crate::cli::Cli;
use anyhow::{bail, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

/// Write the completion script for `shell` (or `$SHELL`) to stdout.
pub fn generate(shell: Option<Shell>) -> Result<()> {
    write_script(shell, &mut std::io::stdout())
}

fn write_script(shell: Option<Shell>, out: &mut dyn Write) -> Result<()> {
    let Some(shell) = shell.or_else(Shell::from_env) else {
        bail!("Could not detect the shell. Pass one of: bash, zsh, fish, elvish, powershell");
    };
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
    Ok(())
}
