//! Job grouping index.
//!
//! A derived read model from `job_id` tags on documents: job →
//! {content documents, config documents}. The documents table is the
//! only source of truth; the index is write-through maintained on job
//! assignment and fully rebuildable at any time, so brief staleness is
//! harmless.

use serde::Serialize;

use crate::error::Result;
use crate::model::DocumentKind;
use crate::storage::SqliteStorage;

/// Members of one job, partitioned by document kind.
#[derive(Debug, Default, Clone, Serialize)]
pub struct JobMembers {
    pub job_id: String,
    pub content_refs: Vec<String>,
    pub config_refs: Vec<String>,
}

impl JobMembers {
    /// Total member count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content_refs.len() + self.config_refs.len()
    }

    /// Whether the job has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rebuild the job index from the documents table.
///
/// Returns the number of indexed documents.
///
/// # Errors
///
/// Returns an error on database failure.
pub fn rebuild(storage: &SqliteStorage) -> Result<usize> {
    let conn = storage.conn();
    conn.execute("DELETE FROM job_index", [])?;
    let inserted = conn.execute(
        "INSERT INTO job_index (job_id, document_id, kind)
         SELECT job_id, id, kind FROM documents WHERE job_id IS NOT NULL",
        [],
    )?;
    Ok(inserted)
}

/// List all job ids with member counts, alphabetically.
///
/// # Errors
///
/// Returns an error on database failure.
pub fn list(storage: &SqliteStorage) -> Result<Vec<(String, usize)>> {
    let mut stmt = storage.conn().prepare(
        "SELECT job_id, COUNT(*) FROM job_index GROUP BY job_id ORDER BY job_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    rows.map(|r| {
        let (job, count) = r?;
        Ok((job, usize::try_from(count).unwrap_or_default()))
    })
    .collect()
}

/// Resolve one job's member documents, partitioned by kind.
///
/// # Errors
///
/// Returns an error on database failure.
pub fn members(storage: &SqliteStorage, job_id: &str) -> Result<JobMembers> {
    let mut stmt = storage.conn().prepare(
        "SELECT d.local_ref, j.kind
         FROM job_index j JOIN documents d ON d.id = j.document_id
         WHERE j.job_id = ?1
         ORDER BY d.local_ref",
    )?;
    let rows = stmt.query_map([job_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut result = JobMembers {
        job_id: job_id.to_string(),
        ..JobMembers::default()
    };
    for row in rows {
        let (local_ref, kind) = row?;
        match DocumentKind::parse(&kind) {
            DocumentKind::Content => result.content_refs.push(local_ref),
            DocumentKind::Config => result.config_refs.push(local_ref),
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentKind;

    fn storage_with_jobs() -> SqliteStorage {
        let mut s = SqliteStorage::open_in_memory().unwrap();
        let mut a = s
            .get_or_create_document("docs/a.md", DocumentKind::Content, "en", "test")
            .unwrap();
        let mut b = s
            .get_or_create_document("config/labels.json", DocumentKind::Config, "en", "test")
            .unwrap();
        let mut c = s
            .get_or_create_document("docs/c.md", DocumentKind::Content, "en", "test")
            .unwrap();
        s.set_job(&mut a, Some("launch"), "test").unwrap();
        s.set_job(&mut b, Some("launch"), "test").unwrap();
        s.set_job(&mut c, Some("cleanup"), "test").unwrap();
        s
    }

    #[test]
    fn test_members_partitioned_by_kind() {
        let s = storage_with_jobs();
        let job = members(&s, "launch").unwrap();
        assert_eq!(job.content_refs, vec!["docs/a.md"]);
        assert_eq!(job.config_refs, vec!["config/labels.json"]);
        assert_eq!(job.len(), 2);
    }

    #[test]
    fn test_list_jobs() {
        let s = storage_with_jobs();
        let jobs = list(&s).unwrap();
        assert_eq!(jobs, vec![("cleanup".to_string(), 1), ("launch".to_string(), 2)]);
    }

    #[test]
    fn test_rebuild_reproduces_write_through_state() {
        let s = storage_with_jobs();
        let before = members(&s, "launch").unwrap();

        // Corrupt the derived table, then rebuild from documents.
        s.conn().execute("DELETE FROM job_index", []).unwrap();
        assert!(members(&s, "launch").unwrap().is_empty());

        let count = rebuild(&s).unwrap();
        assert_eq!(count, 3);
        let after = members(&s, "launch").unwrap();
        assert_eq!(after.content_refs, before.content_refs);
        assert_eq!(after.config_refs, before.config_refs);
    }

    #[test]
    fn test_clearing_job_removes_membership() {
        let mut s = storage_with_jobs();
        let mut a = s.get_document("docs/a.md").unwrap().unwrap();
        s.set_job(&mut a, None, "test").unwrap();

        let job = members(&s, "launch").unwrap();
        assert!(job.content_refs.is_empty());
        assert_eq!(job.config_refs, vec!["config/labels.json"]);
    }
}
