//! Content provider capability.
//!
//! The engine never touches content storage directly; it goes through
//! `ContentProvider`, implemented once per content kind. The shipped
//! implementation treats documents as project files and writes
//! downloaded translations under `translations/<locale>/<local_ref>`.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::model::DocumentKind;

/// Opaque source payload plus its fingerprint.
#[derive(Debug, Clone)]
pub struct SourceContent {
    /// Raw bytes handed to the TMS.
    pub payload: Vec<u8>,
    /// SHA-256 hex digest, used for local-edit detection.
    pub hash: String,
}

/// Capability interface between the engine and local content.
///
/// One implementation per content kind, composed into the engine rather
/// than branched on type tags.
pub trait ContentProvider {
    /// Whether translation is configured for this local reference at all.
    /// A `false` answer turns upload into a reported no-op.
    fn is_translatable(&self, local_ref: &str) -> bool;

    /// Which document kind this reference belongs to.
    fn kind_of(&self, local_ref: &str) -> DocumentKind {
        let _ = local_ref;
        DocumentKind::Content
    }

    /// Load the source payload for upload/update.
    fn load(&self, local_ref: &str) -> Result<SourceContent>;

    /// Store a downloaded translation for one locale.
    fn store_translation(&self, local_ref: &str, locale: &str, payload: &[u8]) -> Result<()>;
}

/// Compute the SHA-256 hex digest of a payload.
#[must_use]
pub fn content_hash(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    format!("{:x}", hasher.finalize())
}

/// File-based content provider rooted at the project directory.
#[derive(Debug, Clone)]
pub struct FileContentProvider {
    root: PathBuf,
    /// Lower-case file extensions considered translatable.
    extensions: Vec<String>,
}

impl FileContentProvider {
    /// Create a provider for the given project root and extension set.
    #[must_use]
    pub fn new(root: &Path, extensions: &[String]) -> Self {
        Self {
            root: root.to_path_buf(),
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    fn source_path(&self, local_ref: &str) -> PathBuf {
        self.root.join(local_ref)
    }

    /// Where a translation for `locale` lands on disk.
    #[must_use]
    pub fn translation_path(&self, local_ref: &str, locale: &str) -> PathBuf {
        self.root.join("translations").join(locale).join(local_ref)
    }
}

impl ContentProvider for FileContentProvider {
    fn kind_of(&self, local_ref: &str) -> DocumentKind {
        // Structured key/value files behave like config entities for
        // job reporting; everything else is page-like content.
        match Path::new(local_ref).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                DocumentKind::Config
            }
            _ => DocumentKind::Content,
        }
    }

    fn is_translatable(&self, local_ref: &str) -> bool {
        let path = self.source_path(local_ref);
        if !path.is_file() {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e == &ext.to_lowercase()),
            None => false,
        }
    }

    fn load(&self, local_ref: &str) -> Result<SourceContent> {
        let path = self.source_path(local_ref);
        if !path.is_file() {
            return Err(Error::DocumentNotFound {
                local_ref: local_ref.to_string(),
            });
        }
        let payload = fs::read(&path)?;
        let hash = content_hash(&payload);
        Ok(SourceContent { payload, hash })
    }

    fn store_translation(&self, local_ref: &str, locale: &str, payload: &[u8]) -> Result<()> {
        let path = self.translation_path(local_ref, locale);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider(dir: &TempDir) -> FileContentProvider {
        FileContentProvider::new(dir.path(), &["md".to_string(), "json".to_string()])
    }

    #[test]
    fn test_content_hash_is_deterministic() {
        let a = content_hash(b"hello");
        let b = content_hash(b"hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_hash(b"hello!"));
    }

    #[test]
    fn test_kind_of_by_extension() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        assert_eq!(p.kind_of("docs/guide.md"), DocumentKind::Content);
        assert_eq!(p.kind_of("config/labels.json"), DocumentKind::Config);
    }

    #[test]
    fn test_is_translatable_checks_extension_and_existence() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("guide.md"), "# hi").unwrap();
        fs::write(dir.path().join("logo.png"), [0u8; 4]).unwrap();

        let p = provider(&dir);
        assert!(p.is_translatable("guide.md"));
        assert!(!p.is_translatable("logo.png"));
        assert!(!p.is_translatable("missing.md"));
    }

    #[test]
    fn test_load_returns_payload_and_hash() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("guide.md"), "content").unwrap();

        let content = provider(&dir).load("guide.md").unwrap();
        assert_eq!(content.payload, b"content");
        assert_eq!(content.hash, content_hash(b"content"));
    }

    #[test]
    fn test_store_translation_creates_locale_tree() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        p.store_translation("docs/guide.md", "de", b"inhalt").unwrap();

        let stored = fs::read(dir.path().join("translations/de/docs/guide.md")).unwrap();
        assert_eq!(stored, b"inhalt");
    }
}
