//! Document and target records.
//!
//! A `Document` is the unit of synchronization: one translatable local
//! content item, mapped to at most one remote TMS document. `Target`
//! rows hang off a document, one per destination locale.

use serde::{Deserialize, Serialize};

use super::status::{SourceStatus, TargetStatus};

/// Kind of local content a document tracks.
///
/// Job grouping reports content and config documents separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Regular translatable content (pages, articles, resources).
    Content,
    /// Configuration-style content (labels, settings text).
    Config,
}

impl DocumentKind {
    /// String representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Config => "config",
        }
    }

    /// Parse from a storage string, defaulting unknown input to content.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "config" => Self::Config,
            _ => Self::Content,
        }
    }
}

impl Default for DocumentKind {
    fn default() -> Self {
        Self::Content
    }
}

/// A tracked document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (e.g. "doc_1a2b3c4d5e6f").
    pub id: String,

    /// Opaque local identity (project-relative path). Owned by the host;
    /// the engine only stores it as a key.
    pub local_ref: String,

    /// Content vs. config, for job-index partitioning.
    pub kind: DocumentKind,

    /// The content's original language.
    pub source_locale: String,

    /// Remote TMS document id. Non-null iff the source is tracked
    /// (`source_status != untracked`).
    pub remote_id: Option<String>,

    /// Previous remote id, retained transiently so an `import_failure`
    /// after an id rotation can roll back.
    pub previous_remote_id: Option<String>,

    /// Caller-assigned grouping tag. Never set by the engine.
    pub job_id: Option<String>,

    /// Automation profile; `None` falls back to the system default policy.
    pub profile_id: Option<String>,

    /// Current source lifecycle status.
    pub source_status: SourceStatus,

    /// SHA-256 of the last payload sent to the TMS, for local-edit detection.
    pub content_hash: Option<String>,

    /// Stamped on the first import-complete confirmation. Never on failure.
    pub last_uploaded_at: Option<i64>,

    /// Stamped on each successful update call. Never on failure.
    pub last_updated_at: Option<i64>,

    /// Timestamp of the newest inbound notification applied to this
    /// document; older payloads are skipped.
    pub last_event_at: Option<i64>,

    /// Creation timestamp (Unix milliseconds).
    pub created_at: i64,

    /// Last mutation timestamp (Unix milliseconds).
    pub updated_at: i64,
}

impl Document {
    /// Create a new untracked document.
    #[must_use]
    pub fn new(local_ref: &str, kind: DocumentKind, source_locale: &str) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let id = format!("doc_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);

        Self {
            id,
            local_ref: local_ref.to_string(),
            kind,
            source_locale: source_locale.to_string(),
            remote_id: None,
            previous_remote_id: None,
            job_id: None,
            profile_id: None,
            source_status: SourceStatus::Untracked,
            content_hash: None,
            last_uploaded_at: None,
            last_updated_at: None,
            last_event_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assign a job grouping tag.
    #[must_use]
    pub fn with_job(mut self, job_id: &str) -> Self {
        self.job_id = Some(job_id.to_string());
        self
    }

    /// Assign an automation profile.
    #[must_use]
    pub fn with_profile(mut self, profile_id: &str) -> Self {
        self.profile_id = Some(profile_id.to_string());
        self
    }
}

/// One target language of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Owning document id.
    pub document_id: String,

    /// Destination locale (e.g. "de", "pt-BR").
    pub locale: String,

    /// Current target lifecycle status.
    pub status: TargetStatus,

    /// Distinguishes "never requested" from "requested but not complete".
    /// Bulk checks touch only requested targets.
    pub requested: bool,

    /// Creation timestamp (Unix milliseconds).
    pub created_at: i64,

    /// Last mutation timestamp (Unix milliseconds).
    pub updated_at: i64,
}

impl Target {
    /// Create a new target in the given initial status.
    #[must_use]
    pub fn new(document_id: &str, locale: &str, status: TargetStatus) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            document_id: document_id.to_string(),
            locale: locale.to_string(),
            status,
            requested: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_untracked() {
        let doc = Document::new("docs/guide.md", DocumentKind::Content, "en");
        assert!(doc.id.starts_with("doc_"));
        assert_eq!(doc.source_status, SourceStatus::Untracked);
        assert!(doc.remote_id.is_none());
        assert!(doc.last_uploaded_at.is_none());
        assert!(doc.job_id.is_none());
    }

    #[test]
    fn test_document_builders() {
        let doc = Document::new("config/labels.json", DocumentKind::Config, "en")
            .with_job("launch-q3")
            .with_profile("prof_abc");
        assert_eq!(doc.kind, DocumentKind::Config);
        assert_eq!(doc.job_id.as_deref(), Some("launch-q3"));
        assert_eq!(doc.profile_id.as_deref(), Some("prof_abc"));
    }

    #[test]
    fn test_kind_parse_defaults_to_content() {
        assert_eq!(DocumentKind::parse("config"), DocumentKind::Config);
        assert_eq!(DocumentKind::parse("content"), DocumentKind::Content);
        assert_eq!(DocumentKind::parse("???"), DocumentKind::Content);
    }

    #[test]
    fn test_new_target_not_requested() {
        let target = Target::new("doc_1", "de", TargetStatus::Request);
        assert_eq!(target.status, TargetStatus::Request);
        assert!(!target.requested);
    }
}
