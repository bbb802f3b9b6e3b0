//! Target language commands.
//!
//! - `locsync target request <ref> <locale>` - request translation
//! - `locsync target check <ref> <locale>` - re-query progress
//! - `locsync target download <ref> <locale>` - fetch a ready translation
//! - `locsync target check-all <ref>` - bulk re-check requested targets

use std::path::PathBuf;

use crate::cli::TargetCommands;
use crate::error::Result;

use super::{print_outcome, CommandContext};

/// Execute a target command.
///
/// # Errors
///
/// Propagates engine and storage errors.
pub fn execute(
    command: &TargetCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut ctx = CommandContext::open(db.map(PathBuf::as_path), actor)?;

    let outcome = match command {
        TargetCommands::Request { local_ref, locale } => {
            ctx.engine().request_translation(local_ref, locale)?
        }
        TargetCommands::Check { local_ref, locale } => {
            ctx.engine().check_target(local_ref, locale)?
        }
        TargetCommands::Download { local_ref, locale } => {
            ctx.engine().download(local_ref, locale)?
        }
        TargetCommands::CheckAll { local_ref } => ctx.engine().check_all_translations(local_ref)?,
    };
    print_outcome(&outcome, json)
}
