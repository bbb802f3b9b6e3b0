//! Configuration management.
//!
//! Each project keeps a `.locsync/` directory at its root holding
//! `config.json` (project settings) and `locsync.db` (the registry).
//! Discovery walks up from the current directory, so commands work from
//! anywhere inside the project tree.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the per-project workspace directory.
pub const WORKSPACE_DIR: &str = ".locsync";

/// Name of the registry database file inside the workspace.
pub const DB_FILE: &str = "locsync.db";

/// Name of the configuration file inside the workspace.
pub const CONFIG_FILE: &str = "config.json";

/// Per-project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// TMS project this workspace belongs to; webhook payloads for other
    /// projects are reported no-ops.
    pub project_id: String,

    /// The content's original language.
    pub source_locale: String,

    /// Enabled target languages. A locale outside this set is disabled
    /// at the system level regardless of profiles.
    pub target_locales: Vec<String>,

    /// Lower-case file extensions considered translatable.
    #[serde(default = "default_extensions")]
    pub translatable_extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    ["md", "html", "txt", "json", "yml", "yaml"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl ProjectConfig {
    /// A fresh config with defaults for `locsync init`.
    #[must_use]
    pub fn new(project_id: &str, source_locale: &str, target_locales: Vec<String>) -> Self {
        Self {
            project_id: project_id.to_string(),
            source_locale: source_locale.to_string(),
            target_locales,
            translatable_extensions: default_extensions(),
        }
    }

    /// Load the config from a workspace directory.
    ///
    /// # Errors
    ///
    /// Returns a config error when the file is missing or malformed.
    pub fn load(workspace: &Path) -> Result<Self> {
        let path = workspace.join(CONFIG_FILE);
        let raw = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("malformed {}: {e}", path.display())))
    }

    /// Write the config into a workspace directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, workspace: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(workspace.join(CONFIG_FILE), raw)?;
        Ok(())
    }
}

/// Discover the project workspace by walking up from `start`.
#[must_use]
pub fn discover_workspace_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(WORKSPACE_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return None,
        }
    }
}

/// Discover the project workspace from the current directory.
#[must_use]
pub fn discover_workspace() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    discover_workspace_from(&cwd)
}

/// Resolve the database path: explicit override first, then the
/// discovered workspace.
#[must_use]
pub fn resolve_db_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_workspace().map(|ws| ws.join(DB_FILE)),
    }
}

/// The project root is the parent of the workspace directory.
#[must_use]
pub fn project_root(workspace: &Path) -> PathBuf {
    workspace
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Default actor name for the audit trail.
#[must_use]
pub fn default_actor() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "locsync".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::new("proj-1", "en", vec!["de".into(), "es".into()]);
        config.save(dir.path()).unwrap();

        let loaded = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.project_id, "proj-1");
        assert_eq!(loaded.source_locale, "en");
        assert_eq!(loaded.target_locales, vec!["de", "es"]);
        assert!(loaded.translatable_extensions.contains(&"md".to_string()));
    }

    #[test]
    fn test_load_missing_config_is_config_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ProjectConfig::load(dir.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path().join(WORKSPACE_DIR);
        fs::create_dir_all(&workspace).unwrap();
        let nested = dir.path().join("docs/guides");
        fs::create_dir_all(&nested).unwrap();

        let found = discover_workspace_from(&nested).unwrap();
        assert_eq!(found, workspace);
    }

    #[test]
    fn test_project_root_is_workspace_parent() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path().join(WORKSPACE_DIR);
        assert_eq!(project_root(&workspace), dir.path());
    }
}
