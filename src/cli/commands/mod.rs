//! Command implementations.

pub mod completions;
pub mod document;
pub mod init;
pub mod job;
pub mod profile;
pub mod status;
pub mod target;
pub mod version;
pub mod webhook;

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::config::{self, ProjectConfig};
use crate::content::FileContentProvider;
use crate::engine::{CommandOutcome, SyncEngine};
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use crate::tms::SandboxTmsClient;

/// Everything a command needs to run against the project workspace.
pub struct CommandContext {
    pub workspace: PathBuf,
    pub config: ProjectConfig,
    pub storage: SqliteStorage,
    pub provider: FileContentProvider,
    pub tms: SandboxTmsClient,
    pub actor: String,
}

impl CommandContext {
    /// Discover the workspace and open every collaborator.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` when no workspace or database exists.
    pub fn open(db: Option<&Path>, actor: Option<&str>) -> Result<Self> {
        let workspace = config::discover_workspace().ok_or(Error::NotInitialized)?;
        let cfg = ProjectConfig::load(&workspace)?;

        let db_path = db
            .map(Path::to_path_buf)
            .unwrap_or_else(|| workspace.join(config::DB_FILE));
        if !db_path.exists() {
            return Err(Error::NotInitialized);
        }
        let storage = SqliteStorage::open(&db_path)?;

        let provider = FileContentProvider::new(
            &config::project_root(&workspace),
            &cfg.translatable_extensions,
        );
        let tms = SandboxTmsClient::new(workspace.join("sandbox"));
        let actor = actor.map(String::from).unwrap_or_else(config::default_actor);

        Ok(Self {
            workspace,
            config: cfg,
            storage,
            provider,
            tms,
            actor,
        })
    }

    /// Build an engine borrowing this context's collaborators.
    pub fn engine(&mut self) -> SyncEngine<'_, SandboxTmsClient> {
        SyncEngine::new(
            &mut self.storage,
            &self.tms,
            &self.provider,
            &self.config.source_locale,
            &self.config.target_locales,
            &self.actor,
        )
    }
}

/// Print a command outcome in text or JSON form.
pub(crate) fn print_outcome(outcome: &CommandOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    for message in &outcome.messages {
        if outcome.performed {
            println!("{message}");
        } else {
            println!("{}", message.dimmed());
        }
    }
    Ok(())
}

/// Format a millisecond timestamp for display.
pub(crate) fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
