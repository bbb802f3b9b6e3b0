//! Initialize a locsync workspace.
//!
//! Creates `.locsync/` at the current directory with `config.json` and
//! the registry database. The database and sandbox are machine-local
//! and ignored by git; the config is meant to be committed.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::cli::InitArgs;
use crate::config::{self, ProjectConfig};
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use crate::validate;

#[derive(Serialize)]
struct InitOutput {
    workspace: PathBuf,
    database: PathBuf,
    project_id: String,
    source_locale: String,
    target_locales: Vec<String>,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` when a workspace exists and `--force`
/// was not given, or an error when the directory cannot be created.
pub fn execute(args: &InitArgs, json: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    let workspace = root.join(config::WORKSPACE_DIR);
    let config_path = workspace.join(config::CONFIG_FILE);

    if config_path.exists() && !args.force {
        return Err(Error::AlreadyInitialized { path: workspace });
    }

    let source_locale = validate::normalize_locale(&args.source_locale)?;
    let mut target_locales = Vec::with_capacity(args.target_locales.len());
    for locale in &args.target_locales {
        let normalized = validate::normalize_locale(locale)?;
        if normalized == source_locale {
            return Err(Error::InvalidArgument(format!(
                "target locale '{normalized}' equals the source locale"
            )));
        }
        if !target_locales.contains(&normalized) {
            target_locales.push(normalized);
        }
    }

    fs::create_dir_all(&workspace)?;

    let project_config =
        ProjectConfig::new(&args.project_id, &source_locale, target_locales.clone());
    project_config.save(&workspace)?;

    // Opening applies the schema.
    let database = workspace.join(config::DB_FILE);
    SqliteStorage::open(&database)?;

    let gitignore = workspace.join(".gitignore");
    if !gitignore.exists() || args.force {
        fs::write(
            &gitignore,
            "# Local state is machine-specific; config.json is shared\nlocsync.db*\nsandbox/\n",
        )?;
    }

    if json {
        let output = InitOutput {
            workspace,
            database,
            project_id: args.project_id.clone(),
            source_locale,
            target_locales,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if crate::is_silent() {
        println!("{}", workspace.display());
    } else {
        println!("Initialized locsync workspace at {}", workspace.display());
        println!("  Project:  {}", args.project_id);
        println!("  Source:   {source_locale}");
        println!("  Targets:  {}", target_locales.join(", "));
    }

    Ok(())
}
