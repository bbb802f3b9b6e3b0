//! Database schema definitions.
//!
//! The complete SQLite schema for the locsync registry. Timestamps are
//! stored as INTEGER (Unix milliseconds).

use rusqlite::{Connection, Result};

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the locsync database.
pub const SCHEMA_SQL: &str = r#"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Core Tables
-- ====================

-- Documents: one row per tracked local content item
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    local_ref TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL DEFAULT 'content',
    source_locale TEXT NOT NULL,
    remote_id TEXT,
    previous_remote_id TEXT,
    job_id TEXT,
    profile_id TEXT,
    source_status TEXT NOT NULL DEFAULT 'untracked',
    content_hash TEXT,
    last_uploaded_at INTEGER,
    last_updated_at INTEGER,
    last_event_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_remote ON documents(remote_id);
CREATE INDEX IF NOT EXISTS idx_documents_job ON documents(job_id);
CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(source_status);

-- Targets: per-destination-locale sub-state of a document
CREATE TABLE IF NOT EXISTS targets (
    document_id TEXT NOT NULL,
    locale TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'untracked',
    requested INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (document_id, locale),
    FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_targets_status ON targets(status);
CREATE INDEX IF NOT EXISTS idx_targets_requested ON targets(requested);

-- Profiles: named automation policies
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    auto_upload INTEGER NOT NULL DEFAULT 0,
    auto_request INTEGER NOT NULL DEFAULT 0,
    auto_download INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Per-locale profile overrides. disabled=1 wins over the custom flags;
-- NULL custom flags fall back to the profile globals.
CREATE TABLE IF NOT EXISTS profile_overrides (
    profile_id TEXT NOT NULL,
    locale TEXT NOT NULL,
    disabled INTEGER NOT NULL DEFAULT 0,
    auto_request INTEGER,
    auto_download INTEGER,
    PRIMARY KEY (profile_id, locale),
    FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
);

-- Job index: derived read model, rebuildable from documents at any time
CREATE TABLE IF NOT EXISTS job_index (
    job_id TEXT NOT NULL,
    document_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    PRIMARY KEY (job_id, document_id)
);

CREATE INDEX IF NOT EXISTS idx_job_index_job ON job_index(job_id);

-- ====================
-- Audit Events
-- ====================

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    event_type TEXT NOT NULL,
    actor TEXT NOT NULL,
    old_value TEXT,
    new_value TEXT,
    comment TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id);
CREATE INDEX IF NOT EXISTS idx_events_created ON events(created_at DESC);
"#;

/// Apply the base schema to a connection.
///
/// Idempotent: every statement is `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if schema execution fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_applies_to_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        // Core tables exist
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('documents','targets','profiles','profile_overrides','job_index','events')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        apply_schema(&conn).unwrap();
    }
}
