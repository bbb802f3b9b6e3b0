//! Filesystem-backed sandbox TMS.
//!
//! A local stand-in for a real TMS connector: uploads land in a
//! directory, imports and translations complete instantly, and
//! downloads return the stored payload tagged with the locale. Useful
//! for development and end-to-end walkthroughs without a remote
//! account. Production deployments implement [`TmsClient`] over their
//! own transport.

use std::fs;
use std::path::PathBuf;

use super::{RemoteProgress, TmsClient, TmsError, TmsResult};

/// Sandbox client rooted inside the project workspace.
#[derive(Debug, Clone)]
pub struct SandboxTmsClient {
    root: PathBuf,
}

impl SandboxTmsClient {
    /// Create a sandbox under the given directory (e.g.
    /// `.locsync/sandbox`).
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn document_path(&self, remote_id: &str) -> PathBuf {
        self.root.join("documents").join(remote_id)
    }

    fn target_marker(&self, remote_id: &str, locale: &str) -> PathBuf {
        self.root.join("targets").join(format!("{remote_id}.{locale}"))
    }

    fn io_err(e: &std::io::Error) -> TmsError {
        TmsError::Generic(e.to_string())
    }
}

impl TmsClient for SandboxTmsClient {
    fn upload(&self, _source_locale: &str, content: &[u8]) -> TmsResult<String> {
        let remote_id = format!(
            "sbx-{}",
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );
        let path = self.document_path(&remote_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_err(&e))?;
        }
        fs::write(&path, content).map_err(|e| Self::io_err(&e))?;
        Ok(remote_id)
    }

    fn update(&self, remote_id: &str, content: &[u8]) -> TmsResult<()> {
        let path = self.document_path(remote_id);
        if !path.is_file() {
            return Err(TmsError::DocumentArchived);
        }
        fs::write(&path, content).map_err(|e| Self::io_err(&e))
    }

    fn check_document(&self, remote_id: &str) -> TmsResult<RemoteProgress> {
        if self.document_path(remote_id).is_file() {
            Ok(RemoteProgress::done())
        } else {
            Err(TmsError::DocumentArchived)
        }
    }

    fn add_target(&self, remote_id: &str, locale: &str) -> TmsResult<()> {
        if !self.document_path(remote_id).is_file() {
            return Err(TmsError::DocumentArchived);
        }
        let marker = self.target_marker(remote_id, locale);
        if let Some(parent) = marker.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_err(&e))?;
        }
        fs::write(&marker, b"requested").map_err(|e| Self::io_err(&e))
    }

    fn check_target(&self, remote_id: &str, locale: &str) -> TmsResult<RemoteProgress> {
        if self.target_marker(remote_id, locale).is_file() {
            Ok(RemoteProgress::done())
        } else {
            Ok(RemoteProgress::at(0))
        }
    }

    fn download_target(&self, remote_id: &str, locale: &str) -> TmsResult<Vec<u8>> {
        if !self.target_marker(remote_id, locale).is_file() {
            return Err(TmsError::Generic(format!(
                "no translation requested for {remote_id}/{locale}"
            )));
        }
        let source = fs::read(self.document_path(remote_id)).map_err(|e| Self::io_err(&e))?;
        let mut translated = format!("[{locale}] ").into_bytes();
        translated.extend_from_slice(&source);
        Ok(translated)
    }
}
