//! SQLite storage implementation.
//!
//! The registry of record: documents, targets, profiles, the derived job
//! index, and the audit event log. All mutations to one document go
//! through this connection with immediate transactions, which serializes
//! racing webhook and command writers on the same database.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::model::{
    Document, DocumentKind, LanguageOverride, Profile, SourceStatus, Target, TargetStatus,
};
use crate::storage::events::{insert_event, Event, EventType};
use crate::storage::migrations::run_migrations;
use crate::storage::schema::apply_schema;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl SqliteStorage {
    /// Open (or create) a database at the given path.
    ///
    /// Applies the base schema and pending migrations, enables WAL and a
    /// busy timeout so concurrent invocations queue instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        apply_schema(&conn)?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests).
    ///
    /// # Errors
    ///
    /// Returns an error if schema application fails.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        apply_schema(&conn)?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection (event queries, job index).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn record(&self, event: &Event) -> Result<()> {
        insert_event(&self.conn, event)?;
        Ok(())
    }

    // ── Documents ─────────────────────────────────────────────

    /// Get a document by local reference, creating an untracked row if
    /// none exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn get_or_create_document(
        &mut self,
        local_ref: &str,
        kind: DocumentKind,
        source_locale: &str,
        actor: &str,
    ) -> Result<Document> {
        if let Some(doc) = self.get_document(local_ref)? {
            return Ok(doc);
        }

        let doc = Document::new(local_ref, kind, source_locale);
        self.conn.execute(
            "INSERT INTO documents (id, local_ref, kind, source_locale, source_status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                doc.id,
                doc.local_ref,
                doc.kind.as_str(),
                doc.source_locale,
                doc.source_status.as_str(),
                doc.created_at,
                doc.updated_at,
            ],
        )?;
        self.record(&Event::new("document", &doc.id, EventType::DocumentTracked, actor)
            .with_comment(local_ref))?;
        Ok(doc)
    }

    /// Look up a document by local reference.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn get_document(&self, local_ref: &str) -> Result<Option<Document>> {
        self.conn
            .prepare(
                "SELECT id, local_ref, kind, source_locale, remote_id, previous_remote_id,
                        job_id, profile_id, source_status, content_hash,
                        last_uploaded_at, last_updated_at, last_event_at, created_at, updated_at
                 FROM documents WHERE local_ref = ?1",
            )?
            .query_row([local_ref], row_to_document)
            .optional()
            .map_err(Error::from)
    }

    /// Look up a document by its surrogate id.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn get_document_by_id(&self, id: &str) -> Result<Option<Document>> {
        self.conn
            .prepare(
                "SELECT id, local_ref, kind, source_locale, remote_id, previous_remote_id,
                        job_id, profile_id, source_status, content_hash,
                        last_uploaded_at, last_updated_at, last_event_at, created_at, updated_at
                 FROM documents WHERE id = ?1",
            )?
            .query_row([id], row_to_document)
            .optional()
            .map_err(Error::from)
    }

    /// Resolve an inbound notification's remote id to a document.
    ///
    /// Webhooks race with local deletion, so a miss here is expected and
    /// must be reported, not thrown: callers receive `None`.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn find_by_remote_id(&self, remote_id: &str) -> Result<Option<Document>> {
        self.conn
            .prepare(
                "SELECT id, local_ref, kind, source_locale, remote_id, previous_remote_id,
                        job_id, profile_id, source_status, content_hash,
                        last_uploaded_at, last_updated_at, last_event_at, created_at, updated_at
                 FROM documents WHERE remote_id = ?1",
            )?
            .query_row([remote_id], row_to_document)
            .optional()
            .map_err(Error::from)
    }

    /// List all tracked documents, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, local_ref, kind, source_locale, remote_id, previous_remote_id,
                    job_id, profile_id, source_status, content_hash,
                    last_uploaded_at, last_updated_at, last_event_at, created_at, updated_at
             FROM documents ORDER BY created_at",
        )?;
        let rows = stmt.query_map([], row_to_document)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Persist every mutable field of a document row.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn save_document(&mut self, doc: &Document) -> Result<()> {
        self.conn.execute(
            "UPDATE documents SET
                remote_id = ?2, previous_remote_id = ?3, job_id = ?4, profile_id = ?5,
                source_status = ?6, content_hash = ?7, last_uploaded_at = ?8,
                last_updated_at = ?9, last_event_at = ?10, updated_at = ?11
             WHERE id = ?1",
            rusqlite::params![
                doc.id,
                doc.remote_id,
                doc.previous_remote_id,
                doc.job_id,
                doc.profile_id,
                doc.source_status.as_str(),
                doc.content_hash,
                doc.last_uploaded_at,
                doc.last_updated_at,
                doc.last_event_at,
                now_millis(),
            ],
        )?;
        Ok(())
    }

    /// Change the source status, recording an audit event.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn set_source_status(
        &mut self,
        doc: &mut Document,
        status: SourceStatus,
        actor: &str,
    ) -> Result<()> {
        if doc.source_status == status {
            return Ok(());
        }
        let old = doc.source_status;
        doc.source_status = status;
        self.save_document(doc)?;
        self.record(
            &Event::new("document", &doc.id, EventType::SourceStatusChanged, actor)
                .with_values(Some(old.as_str().into()), Some(status.as_str().into())),
        )
    }

    /// Assign a new remote id, retaining the old one for rollback.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn set_remote_id(&mut self, doc: &mut Document, remote_id: &str, actor: &str) -> Result<()> {
        let old = doc.remote_id.take();
        let event_type = if old.is_some() {
            EventType::RemoteIdRotated
        } else {
            EventType::RemoteIdAssigned
        };
        doc.previous_remote_id = old.clone();
        doc.remote_id = Some(remote_id.to_string());
        self.save_document(doc)?;
        self.record(
            &Event::new("document", &doc.id, event_type, actor)
                .with_values(old, Some(remote_id.to_string())),
        )
    }

    /// Restore the previous remote id after an `import_failure`.
    ///
    /// The failed id is discarded; the prior one becomes current again.
    /// With no prior id, `remote_id` becomes null (first-upload failure).
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn rollback_remote_id(&mut self, doc: &mut Document, actor: &str) -> Result<()> {
        let failed = doc.remote_id.take();
        doc.remote_id = doc.previous_remote_id.take();
        self.save_document(doc)?;
        self.record(
            &Event::new("document", &doc.id, EventType::RemoteIdRolledBack, actor)
                .with_values(failed, doc.remote_id.clone()),
        )
    }

    /// Full reset: untracked source, no remote ids, all targets removed.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn clear_document(&mut self, doc: &mut Document, actor: &str) -> Result<()> {
        doc.remote_id = None;
        doc.previous_remote_id = None;
        doc.source_status = SourceStatus::Untracked;
        doc.content_hash = None;
        doc.last_uploaded_at = None;
        doc.last_updated_at = None;
        doc.last_event_at = None;
        self.save_document(doc)?;
        self.conn
            .execute("DELETE FROM targets WHERE document_id = ?1", [&doc.id])?;
        self.record(&Event::new("document", &doc.id, EventType::DocumentCleared, actor))
    }

    /// Assign (or clear) the caller-owned job grouping tag.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn set_job(&mut self, doc: &mut Document, job_id: Option<&str>, actor: &str) -> Result<()> {
        let old = doc.job_id.take();
        doc.job_id = job_id.map(String::from);
        self.save_document(doc)?;
        // Write-through to the derived index; rebuild remains authoritative.
        self.conn
            .execute("DELETE FROM job_index WHERE document_id = ?1", [&doc.id])?;
        if let Some(job) = &doc.job_id {
            self.conn.execute(
                "INSERT OR REPLACE INTO job_index (job_id, document_id, kind) VALUES (?1, ?2, ?3)",
                rusqlite::params![job, doc.id, doc.kind.as_str()],
            )?;
        }
        self.record(
            &Event::new("document", &doc.id, EventType::JobAssigned, actor)
                .with_values(old, doc.job_id.clone()),
        )
    }

    /// Assign (or clear) the document's automation profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile does not exist or on database failure.
    pub fn set_document_profile(
        &mut self,
        doc: &mut Document,
        profile_id: Option<&str>,
        actor: &str,
    ) -> Result<()> {
        if let Some(id) = profile_id {
            if self.get_profile(id)?.is_none() {
                return Err(Error::ProfileNotFound { id: id.to_string() });
            }
        }
        let old = doc.profile_id.take();
        doc.profile_id = profile_id.map(String::from);
        self.save_document(doc)?;
        self.record(
            &Event::new("document", &doc.id, EventType::ProfileAssigned, actor)
                .with_values(old, doc.profile_id.clone()),
        )
    }

    // ── Targets ───────────────────────────────────────────────

    /// Look up one target of a document.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn get_target(&self, document_id: &str, locale: &str) -> Result<Option<Target>> {
        self.conn
            .prepare(
                "SELECT document_id, locale, status, requested, created_at, updated_at
                 FROM targets WHERE document_id = ?1 AND locale = ?2",
            )?
            .query_row([document_id, locale], row_to_target)
            .optional()
            .map_err(Error::from)
    }

    /// List all materialized targets of a document, ordered by locale.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn list_targets(&self, document_id: &str) -> Result<Vec<Target>> {
        let mut stmt = self.conn.prepare(
            "SELECT document_id, locale, status, requested, created_at, updated_at
             FROM targets WHERE document_id = ?1 ORDER BY locale",
        )?;
        let rows = stmt.query_map([document_id], row_to_target)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Upsert one target's status and requested flag, recording the
    /// transition when the status actually changes.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn set_target_state(
        &mut self,
        document_id: &str,
        locale: &str,
        status: TargetStatus,
        requested: bool,
        actor: &str,
    ) -> Result<Target> {
        let existing = self.get_target(document_id, locale)?;
        let now = now_millis();

        match existing {
            Some(mut target) => {
                let old = target.status;
                target.status = status;
                target.requested = requested;
                target.updated_at = now;
                self.conn.execute(
                    "UPDATE targets SET status = ?3, requested = ?4, updated_at = ?5
                     WHERE document_id = ?1 AND locale = ?2",
                    rusqlite::params![
                        document_id,
                        locale,
                        status.as_str(),
                        i32::from(requested),
                        now
                    ],
                )?;
                if old != status {
                    self.record(
                        &Event::new("target", &format!("{document_id}:{locale}"),
                            EventType::TargetStatusChanged, actor)
                        .with_values(Some(old.as_str().into()), Some(status.as_str().into())),
                    )?;
                }
                Ok(target)
            }
            None => {
                let mut target = Target::new(document_id, locale, status);
                target.requested = requested;
                self.conn.execute(
                    "INSERT INTO targets (document_id, locale, status, requested, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        document_id,
                        locale,
                        status.as_str(),
                        i32::from(requested),
                        target.created_at,
                        target.updated_at
                    ],
                )?;
                self.record(
                    &Event::new("target", &format!("{document_id}:{locale}"),
                        EventType::TargetStatusChanged, actor)
                    .with_values(None, Some(status.as_str().into())),
                )?;
                Ok(target)
            }
        }
    }

    // ── Profiles ──────────────────────────────────────────────

    /// Insert a new profile with its overrides.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure (including name collisions).
    pub fn create_profile(&mut self, profile: &Profile, actor: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO profiles (id, name, auto_upload, auto_request, auto_download, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                profile.id,
                profile.name,
                i32::from(profile.auto_upload),
                i32::from(profile.auto_request),
                i32::from(profile.auto_download),
                profile.created_at,
                profile.updated_at,
            ],
        )?;
        for (locale, ov) in &profile.language_overrides {
            self.write_override(&profile.id, locale, *ov)?;
        }
        self.record(&Event::new("profile", &profile.id, EventType::ProfileCreated, actor)
            .with_comment(&profile.name))
    }

    /// Update a profile's global flags and overrides in place.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn update_profile(&mut self, profile: &Profile, actor: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE profiles SET name = ?2, auto_upload = ?3, auto_request = ?4,
                    auto_download = ?5, updated_at = ?6
             WHERE id = ?1",
            rusqlite::params![
                profile.id,
                profile.name,
                i32::from(profile.auto_upload),
                i32::from(profile.auto_request),
                i32::from(profile.auto_download),
                now_millis(),
            ],
        )?;
        self.conn
            .execute("DELETE FROM profile_overrides WHERE profile_id = ?1", [&profile.id])?;
        for (locale, ov) in &profile.language_overrides {
            self.write_override(&profile.id, locale, *ov)?;
        }
        self.record(&Event::new("profile", &profile.id, EventType::ProfileUpdated, actor))
    }

    fn write_override(&self, profile_id: &str, locale: &str, ov: LanguageOverride) -> Result<()> {
        let (disabled, auto_request, auto_download) = match ov {
            LanguageOverride::Disabled => (1, None, None),
            LanguageOverride::Custom {
                auto_request,
                auto_download,
            } => (0, auto_request.map(i32::from), auto_download.map(i32::from)),
        };
        self.conn.execute(
            "INSERT OR REPLACE INTO profile_overrides (profile_id, locale, disabled, auto_request, auto_download)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![profile_id, locale, disabled, auto_request, auto_download],
        )?;
        Ok(())
    }

    /// Look up a profile (with overrides) by id.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let profile = self
            .conn
            .prepare(
                "SELECT id, name, auto_upload, auto_request, auto_download, created_at, updated_at
                 FROM profiles WHERE id = ?1",
            )?
            .query_row([id], row_to_profile)
            .optional()?;
        match profile {
            Some(p) => Ok(Some(self.load_overrides(p)?)),
            None => Ok(None),
        }
    }

    /// Look up a profile (with overrides) by unique name.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn get_profile_by_name(&self, name: &str) -> Result<Option<Profile>> {
        let profile = self
            .conn
            .prepare(
                "SELECT id, name, auto_upload, auto_request, auto_download, created_at, updated_at
                 FROM profiles WHERE name = ?1",
            )?
            .query_row([name], row_to_profile)
            .optional()?;
        match profile {
            Some(p) => Ok(Some(self.load_overrides(p)?)),
            None => Ok(None),
        }
    }

    /// List all profiles (with overrides), oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, auto_upload, auto_request, auto_download, created_at, updated_at
             FROM profiles ORDER BY created_at",
        )?;
        let profiles = stmt
            .query_map([], row_to_profile)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        profiles
            .into_iter()
            .map(|p| self.load_overrides(p))
            .collect()
    }

    fn load_overrides(&self, mut profile: Profile) -> Result<Profile> {
        let mut stmt = self.conn.prepare(
            "SELECT locale, disabled, auto_request, auto_download
             FROM profile_overrides WHERE profile_id = ?1",
        )?;
        let rows = stmt.query_map([&profile.id], |row| {
            let locale: String = row.get(0)?;
            let disabled: i32 = row.get(1)?;
            let auto_request: Option<i32> = row.get(2)?;
            let auto_download: Option<i32> = row.get(3)?;
            let ov = if disabled != 0 {
                LanguageOverride::Disabled
            } else {
                LanguageOverride::Custom {
                    auto_request: auto_request.map(|v| v != 0),
                    auto_download: auto_download.map(|v| v != 0),
                }
            };
            Ok((locale, ov))
        })?;
        for row in rows {
            let (locale, ov) = row?;
            profile.language_overrides.insert(locale, ov);
        }
        Ok(profile)
    }

    /// Resolve a document's effective profile: its assigned profile, or
    /// the system default when none is set or the row has vanished.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn effective_profile(&self, doc: &Document) -> Result<Profile> {
        match &doc.profile_id {
            Some(id) => Ok(self.get_profile(id)?.unwrap_or_else(Profile::system_default)),
            None => Ok(Profile::system_default()),
        }
    }
}

// ── Row mappers ───────────────────────────────────────────────

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let kind: String = row.get(2)?;
    let status: String = row.get(8)?;
    Ok(Document {
        id: row.get(0)?,
        local_ref: row.get(1)?,
        kind: DocumentKind::parse(&kind),
        source_locale: row.get(3)?,
        remote_id: row.get(4)?,
        previous_remote_id: row.get(5)?,
        job_id: row.get(6)?,
        profile_id: row.get(7)?,
        source_status: SourceStatus::parse(&status).unwrap_or_default(),
        content_hash: row.get(9)?,
        last_uploaded_at: row.get(10)?,
        last_updated_at: row.get(11)?,
        last_event_at: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn row_to_target(row: &rusqlite::Row<'_>) -> rusqlite::Result<Target> {
    let status: String = row.get(2)?;
    let requested: i32 = row.get(3)?;
    Ok(Target {
        document_id: row.get(0)?,
        locale: row.get(1)?,
        status: TargetStatus::parse(&status).unwrap_or_default(),
        requested: requested != 0,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    let auto_upload: i32 = row.get(2)?;
    let auto_request: i32 = row.get(3)?;
    let auto_download: i32 = row.get(4)?;
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        auto_upload: auto_upload != 0,
        auto_request: auto_request != 0,
        auto_download: auto_download != 0,
        language_overrides: std::collections::BTreeMap::new(),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SqliteStorage {
        SqliteStorage::open_in_memory().unwrap()
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut s = storage();
        let a = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();
        let b = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(s.list_documents().unwrap().len(), 1);
    }

    #[test]
    fn test_remote_id_assign_rotate_rollback() {
        let mut s = storage();
        let mut doc = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();

        s.set_remote_id(&mut doc, "rem-1", "test").unwrap();
        assert_eq!(doc.remote_id.as_deref(), Some("rem-1"));
        assert_eq!(doc.previous_remote_id, None);

        s.set_remote_id(&mut doc, "rem-2", "test").unwrap();
        assert_eq!(doc.remote_id.as_deref(), Some("rem-2"));
        assert_eq!(doc.previous_remote_id.as_deref(), Some("rem-1"));

        s.rollback_remote_id(&mut doc, "test").unwrap();
        assert_eq!(doc.remote_id.as_deref(), Some("rem-1"));
        assert_eq!(doc.previous_remote_id, None);

        // Persisted, not just in-memory
        let reloaded = s.get_document("docs/a.md").unwrap().unwrap();
        assert_eq!(reloaded.remote_id.as_deref(), Some("rem-1"));
    }

    #[test]
    fn test_rollback_without_previous_clears() {
        let mut s = storage();
        let mut doc = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();
        s.set_remote_id(&mut doc, "rem-1", "test").unwrap();
        s.rollback_remote_id(&mut doc, "test").unwrap();
        assert_eq!(doc.remote_id, None);
    }

    #[test]
    fn test_find_by_remote_id() {
        let mut s = storage();
        let mut doc = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();
        s.set_remote_id(&mut doc, "rem-9", "test").unwrap();

        let found = s.find_by_remote_id("rem-9").unwrap().unwrap();
        assert_eq!(found.local_ref, "docs/a.md");
        assert!(s.find_by_remote_id("rem-nope").unwrap().is_none());
    }

    #[test]
    fn test_clear_document_removes_targets() {
        let mut s = storage();
        let mut doc = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();
        s.set_remote_id(&mut doc, "rem-1", "test").unwrap();
        s.set_target_state(&doc.id.clone(), "de", TargetStatus::Pending, true, "test")
            .unwrap();

        s.clear_document(&mut doc, "test").unwrap();
        assert_eq!(doc.source_status, SourceStatus::Untracked);
        assert_eq!(doc.remote_id, None);
        assert!(s.list_targets(&doc.id).unwrap().is_empty());
    }

    #[test]
    fn test_target_upsert_and_transition_event() {
        let mut s = storage();
        let doc = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();

        s.set_target_state(&doc.id, "de", TargetStatus::Request, false, "test")
            .unwrap();
        let t = s
            .set_target_state(&doc.id, "de", TargetStatus::Pending, true, "test")
            .unwrap();
        assert_eq!(t.status, TargetStatus::Pending);
        assert!(t.requested);

        let events = crate::storage::events::get_events(
            s.conn(),
            "target",
            &format!("{}:de", doc.id),
            None,
        )
        .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_profile_round_trip_with_overrides() {
        let mut s = storage();
        let profile = Profile::new("site-default")
            .with_flags(true, true, false)
            .with_override("fr", LanguageOverride::Disabled)
            .with_override(
                "de",
                LanguageOverride::Custom {
                    auto_request: Some(false),
                    auto_download: None,
                },
            );
        s.create_profile(&profile, "test").unwrap();

        let loaded = s.get_profile_by_name("site-default").unwrap().unwrap();
        assert_eq!(loaded.id, profile.id);
        assert!(loaded.auto_upload);
        assert_eq!(
            loaded.language_overrides.get("fr"),
            Some(&LanguageOverride::Disabled)
        );
        assert_eq!(
            loaded.language_overrides.get("de"),
            Some(&LanguageOverride::Custom {
                auto_request: Some(false),
                auto_download: None
            })
        );
    }

    #[test]
    fn test_effective_profile_falls_back_to_default() {
        let mut s = storage();
        let doc = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();
        let profile = s.effective_profile(&doc).unwrap();
        assert_eq!(profile.id, "prof_default");
        assert!(!profile.auto_request);
    }

    #[test]
    fn test_set_document_profile_requires_existing() {
        let mut s = storage();
        let mut doc = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();
        let err = s.set_document_profile(&mut doc, Some("prof_missing"), "test");
        assert!(matches!(err, Err(Error::ProfileNotFound { .. })));
    }
}
