//! Audit event storage and retrieval.
//!
//! Every status transition, remote-id change, and applied notification
//! is recorded for debugging and history.

use rusqlite::{Connection, Result};

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    // Document events
    DocumentTracked,
    SourceStatusChanged,
    RemoteIdAssigned,
    RemoteIdRotated,
    RemoteIdRolledBack,
    DocumentCleared,
    JobAssigned,
    ProfileAssigned,

    // Target events
    TargetStatusChanged,
    TranslationStored,

    // Profile events
    ProfileCreated,
    ProfileUpdated,
    ProfileDeleted,

    // Notification events
    NotificationApplied,
    NotificationSkipped,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentTracked => "document_tracked",
            Self::SourceStatusChanged => "source_status_changed",
            Self::RemoteIdAssigned => "remote_id_assigned",
            Self::RemoteIdRotated => "remote_id_rotated",
            Self::RemoteIdRolledBack => "remote_id_rolled_back",
            Self::DocumentCleared => "document_cleared",
            Self::JobAssigned => "job_assigned",
            Self::ProfileAssigned => "profile_assigned",
            Self::TargetStatusChanged => "target_status_changed",
            Self::TranslationStored => "translation_stored",
            Self::ProfileCreated => "profile_created",
            Self::ProfileUpdated => "profile_updated",
            Self::ProfileDeleted => "profile_deleted",
            Self::NotificationApplied => "notification_applied",
            Self::NotificationSkipped => "notification_skipped",
        }
    }
}

/// An audit event record.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub event_type: EventType,
    pub actor: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub comment: Option<String>,
    pub created_at: i64,
}

impl Event {
    /// Create a new event (id will be assigned by database).
    #[must_use]
    pub fn new(entity_type: &str, entity_id: &str, event_type: EventType, actor: &str) -> Self {
        Self {
            id: 0,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            event_type,
            actor: actor.to_string(),
            old_value: None,
            new_value: None,
            comment: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Add old/new values for field change tracking.
    #[must_use]
    pub fn with_values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    /// Add a comment to the event.
    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            event.entity_type,
            event.entity_id,
            event.event_type.as_str(),
            event.actor,
            event.old_value,
            event.new_value,
            event.comment,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get events for an entity, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_events(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
    limit: Option<u32>,
) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(100);
    let mut stmt = conn.prepare(
        "SELECT id, entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY created_at DESC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(rusqlite::params![entity_type, entity_id, limit], |row| {
        Ok(Event {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            event_type: parse_event_type(row.get::<_, String>(3)?.as_str()),
            actor: row.get(4)?,
            old_value: row.get(5)?,
            new_value: row.get(6)?,
            comment: row.get(7)?,
            created_at: row.get(8)?,
        })
    })?;

    rows.collect()
}

fn parse_event_type(s: &str) -> EventType {
    match s {
        "document_tracked" => EventType::DocumentTracked,
        "remote_id_assigned" => EventType::RemoteIdAssigned,
        "remote_id_rotated" => EventType::RemoteIdRotated,
        "remote_id_rolled_back" => EventType::RemoteIdRolledBack,
        "document_cleared" => EventType::DocumentCleared,
        "job_assigned" => EventType::JobAssigned,
        "profile_assigned" => EventType::ProfileAssigned,
        "target_status_changed" => EventType::TargetStatusChanged,
        "translation_stored" => EventType::TranslationStored,
        "profile_created" => EventType::ProfileCreated,
        "profile_updated" => EventType::ProfileUpdated,
        "profile_deleted" => EventType::ProfileDeleted,
        "notification_applied" => EventType::NotificationApplied,
        "notification_skipped" => EventType::NotificationSkipped,
        _ => EventType::SourceStatusChanged, // Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    #[test]
    fn test_event_insert_and_get() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let event = Event::new("document", "doc_123", EventType::SourceStatusChanged, "cli")
            .with_values(Some("importing".into()), Some("current".into()));

        let id = insert_event(&conn, &event).unwrap();
        assert!(id > 0);

        let events = get_events(&conn, "document", "doc_123", Some(10)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::SourceStatusChanged);
        assert_eq!(events[0].old_value, Some("importing".to_string()));
        assert_eq!(events[0].new_value, Some("current".to_string()));
    }
}
