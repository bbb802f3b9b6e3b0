//! Shell completion generation.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::error::Result;

/// Execute the completions command.
///
/// # Errors
///
/// Infallible in practice; the signature matches the other handlers.
pub fn execute(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "locsync", &mut std::io::stdout());
    Ok(())
}
