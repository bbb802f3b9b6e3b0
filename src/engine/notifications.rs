//! Inbound event application.
//!
//! Webhook notifications resolve by remote id, pass the stale-event
//! guard, and apply the corresponding lifecycle transition. Unknown
//! documents are reported no-ops: webhooks race with local deletion and
//! the TMS must still receive a success response.

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{SourceStatus, TargetStatus};
use crate::notify::{DispatchOutcome, Notification, NotificationType};
use crate::storage::events::{insert_event, Event, EventType};
use crate::tms::TmsClient;

use super::SyncEngine;

impl<C: TmsClient> SyncEngine<'_, C> {
    /// Apply one inbound notification, returning the dispatch summary.
    ///
    /// # Errors
    ///
    /// Returns an error only on local storage failure. Every
    /// remote-state condition, including an unknown document or a stale
    /// payload, is reported through the outcome.
    pub fn apply_notification(&mut self, n: &Notification) -> Result<DispatchOutcome> {
        let Some(mut doc) = self.storage.find_by_remote_id(&n.document_id)? else {
            debug!(document_id = n.document_id.as_str(), "notification for unknown document");
            return Ok(DispatchOutcome::message(format!(
                "document not found: {}",
                n.document_id
            )));
        };

        // Ordering guard: notifications carry issuance timestamps and
        // can arrive out of order relative to each other and to local
        // commands. An older payload must not overwrite newer state.
        if let (Some(ts), Some(last)) = (n.timestamp, doc.last_event_at) {
            if ts <= last {
                insert_event(
                    self.storage.conn(),
                    &Event::new("document", &doc.id, EventType::NotificationSkipped, &self.actor)
                        .with_comment(&format!("{:?} at {ts} <= {last}", n.kind)),
                )?;
                return Ok(DispatchOutcome::message(
                    "stale notification ignored (older than last applied event)",
                ));
            }
        }

        let mut outcome = DispatchOutcome::default();
        match n.kind {
            NotificationType::DocumentUploaded => {
                self.on_document_imported(&mut doc, n.complete.unwrap_or(true), &mut outcome)?;
            }
            NotificationType::DocumentUpdated => {
                self.on_document_imported(&mut doc, true, &mut outcome)?;
            }
            NotificationType::ImportFailure => {
                self.on_import_failure(&mut doc, &mut outcome)?;
            }
            NotificationType::DocumentArchived => {
                self.archive_reset(&mut doc)?;
                outcome
                    .messages
                    .push("remote document archived; local tracking reset".to_string());
            }
            NotificationType::DocumentDeleted => {
                self.archive_reset(&mut doc)?;
                let by = n.deleted_by.as_deref().unwrap_or("unknown");
                outcome
                    .messages
                    .push(format!("remote document deleted by {by}; local tracking reset"));
            }
            NotificationType::DocumentCancelled => {
                self.on_document_cancelled(&mut doc, &mut outcome)?;
            }
            NotificationType::Target => {
                self.on_target_event(&mut doc, n, &mut outcome)?;
            }
            NotificationType::TargetDeleted => {
                self.on_target_terminal(&mut doc, n, TargetStatus::Untracked, &mut outcome)?;
            }
            NotificationType::TargetCancelled => {
                self.on_target_terminal(&mut doc, n, TargetStatus::Cancelled, &mut outcome)?;
            }
        }

        if let Some(ts) = n.timestamp {
            if let Some(mut fresh) = self.storage.get_document_by_id(&doc.id)? {
                fresh.last_event_at = Some(ts);
                self.storage.save_document(&fresh)?;
            }
        }
        insert_event(
            self.storage.conn(),
            &Event::new("document", &doc.id, EventType::NotificationApplied, &self.actor)
                .with_comment(&format!("{:?}", n.kind)),
        )?;

        Ok(outcome)
    }

    /// `document_uploaded` / `document_updated`: a complete import flips
    /// the source to CURRENT and promotes targets; newly eligible
    /// targets are auto-requested per the resolved policy.
    fn on_document_imported(
        &mut self,
        doc: &mut crate::model::Document,
        complete: bool,
        outcome: &mut DispatchOutcome,
    ) -> Result<()> {
        if !complete {
            outcome
                .messages
                .push("import in progress; source stays importing".to_string());
            return Ok(());
        }

        match doc.source_status {
            SourceStatus::Importing | SourceStatus::Error => {
                let newly = self.mark_source_current(doc)?;
                outcome
                    .messages
                    .push("import complete; source is current".to_string());
                self.auto_request_continuation(doc, &newly, outcome)?;
            }
            SourceStatus::Current => {
                // Redundant delivery; promotion is idempotent.
                let newly = self.promote_targets(doc)?;
                outcome.messages.push("source already current".to_string());
                self.auto_request_continuation(doc, &newly, outcome)?;
            }
            other => {
                outcome.messages.push(format!(
                    "import complete reported while source is {other}; ignored"
                ));
            }
        }
        Ok(())
    }

    /// `import_failure`: the source goes to ERROR and the remote id is
    /// rolled back to its previous value, not the failed new one. A
    /// first upload has no previous value; the document resets to
    /// UNTRACKED so the tracked-iff-remote invariant holds.
    fn on_import_failure(
        &mut self,
        doc: &mut crate::model::Document,
        outcome: &mut DispatchOutcome,
    ) -> Result<()> {
        if doc.previous_remote_id.is_some() {
            self.storage.rollback_remote_id(doc, &self.actor)?;
            self.storage
                .set_source_status(doc, SourceStatus::Error, &self.actor)?;
            outcome
                .messages
                .push("import failed; remote id rolled back to previous version".to_string());
        } else {
            self.archive_reset(doc)?;
            outcome
                .messages
                .push("initial import failed; document reset for re-upload".to_string());
        }
        Ok(())
    }

    /// `document_cancelled`: source and every target go CANCELLED. The
    /// remote id stays known; only deletion or an explicit clear drops it.
    fn on_document_cancelled(
        &mut self,
        doc: &mut crate::model::Document,
        outcome: &mut DispatchOutcome,
    ) -> Result<()> {
        self.storage
            .set_source_status(doc, SourceStatus::Cancelled, &self.actor)?;
        for target in self.storage.list_targets(&doc.id)? {
            self.storage.set_target_state(
                &doc.id,
                &target.locale,
                TargetStatus::Cancelled,
                false,
                &self.actor,
            )?;
        }
        outcome
            .messages
            .push("remote document cancelled; all targets cancelled".to_string());
        Ok(())
    }

    /// `target` progress/completion for one locale.
    fn on_target_event(
        &mut self,
        doc: &mut crate::model::Document,
        n: &Notification,
        outcome: &mut DispatchOutcome,
    ) -> Result<()> {
        let Some(locale) = n.locale.clone() else {
            outcome
                .messages
                .push("target event missing locale; ignored".to_string());
            return Ok(());
        };
        if !self.locale_enabled(&locale) {
            outcome
                .messages
                .push(format!("locale '{locale}' is not enabled; ignored"));
            return Ok(());
        }

        let complete = n.complete.unwrap_or(false) || n.progress.unwrap_or(0) >= 100;
        let target = self.storage.get_target(&doc.id, &locale)?;

        if !complete {
            let progress = n.progress.unwrap_or(0);
            match &target {
                Some(t) if !t.status.is_check_movable() || t.status == TargetStatus::Ready => {
                    // Monotonicity: a lower progress report never
                    // regresses a ready or downloaded target.
                    outcome.messages.push(format!(
                        "'{locale}' progress {progress}% ignored; target is {}",
                        t.status
                    ));
                }
                Some(t) if t.requested => {
                    outcome
                        .messages
                        .push(format!("'{locale}' translation in progress ({progress}%)"));
                }
                _ => {
                    outcome.messages.push(format!(
                        "progress for unrequested target '{locale}' ignored"
                    ));
                }
            }
            return Ok(());
        }

        if let Some(t) = &target {
            if !t.status.is_check_movable() {
                outcome.messages.push(format!(
                    "translation for '{locale}' already downloaded"
                ));
                return Ok(());
            }
        }

        let policy = self.storage.effective_profile(doc)?.policy_for(&locale);
        if policy.disabled {
            outcome
                .messages
                .push(format!("'{locale}' is disabled; completion ignored"));
            return Ok(());
        }

        let Some(remote_id) = doc.remote_id.clone() else {
            return Ok(());
        };

        if policy.auto_download {
            match self.tms.download_target(&remote_id, &locale) {
                Ok(payload) => {
                    self.content
                        .store_translation(&doc.local_ref, &locale, &payload)?;
                    self.storage.set_target_state(
                        &doc.id,
                        &locale,
                        TargetStatus::Current,
                        true,
                        &self.actor,
                    )?;
                    outcome.download = true;
                    outcome
                        .messages
                        .push(format!("translation for '{locale}' downloaded automatically"));
                    info!(locale = locale.as_str(), "auto-download complete");
                }
                Err(err) => {
                    // Download failure is confirmable: target in error.
                    self.storage.set_target_state(
                        &doc.id,
                        &locale,
                        TargetStatus::Error,
                        true,
                        &self.actor,
                    )?;
                    outcome
                        .messages
                        .push(format!("auto-download for '{locale}' failed: {err}"));
                }
            }
        } else {
            self.storage
                .set_target_state(&doc.id, &locale, TargetStatus::Ready, true, &self.actor)?;
            outcome
                .messages
                .push(format!("translation for '{locale}' is ready for download"));
        }
        Ok(())
    }

    /// `target_deleted` / `target_cancelled`: force the terminal value
    /// and reset the requested flag so bulk checks cannot resurrect it.
    fn on_target_terminal(
        &mut self,
        doc: &mut crate::model::Document,
        n: &Notification,
        status: TargetStatus,
        outcome: &mut DispatchOutcome,
    ) -> Result<()> {
        let Some(locale) = n.locale.clone() else {
            outcome
                .messages
                .push("target event missing locale; ignored".to_string());
            return Ok(());
        };
        if self.storage.get_target(&doc.id, &locale)?.is_none() {
            outcome
                .messages
                .push(format!("no tracked target for '{locale}'"));
            return Ok(());
        }
        self.storage
            .set_target_state(&doc.id, &locale, status, false, &self.actor)?;
        outcome
            .messages
            .push(format!("target '{locale}' is now {status}"));
        Ok(())
    }

    /// Issue the auto-request continuation for newly eligible locales.
    fn auto_request_continuation(
        &mut self,
        doc: &mut crate::model::Document,
        locales: &[String],
        outcome: &mut DispatchOutcome,
    ) -> Result<()> {
        if locales.is_empty() {
            return Ok(());
        }
        let profile = self.storage.effective_profile(doc)?;
        let local_ref = doc.local_ref.clone();

        for locale in locales {
            if !profile.policy_for(locale).auto_request {
                continue;
            }
            match self.request_translation(&local_ref, locale) {
                Ok(_) => outcome.request_translations.push(locale.clone()),
                Err(e) => outcome
                    .messages
                    .push(format!("auto-request for '{locale}' failed: {e}")),
            }
        }

        // The continuation may have mutated the document row.
        if let Some(fresh) = self.storage.get_document_by_id(&doc.id)? {
            *doc = fresh;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::content::FileContentProvider;
    use crate::engine::SyncEngine;
    use crate::model::{Profile, SourceStatus, TargetStatus};
    use crate::notify::{dispatch, Notification, NotificationType};
    use crate::storage::SqliteStorage;
    use crate::tms::{MockTmsClient, TmsError};

    const GUIDE: &str = "docs/guide.md";

    fn fixture() -> (TempDir, SqliteStorage, MockTmsClient, FileContentProvider) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join(GUIDE), "# hello").unwrap();
        let provider =
            FileContentProvider::new(dir.path(), &["md".to_string(), "json".to_string()]);
        let storage = SqliteStorage::open_in_memory().unwrap();
        (dir, storage, MockTmsClient::new(), provider)
    }

    fn locales() -> Vec<String> {
        vec!["de".to_string(), "es".to_string()]
    }

    fn engine<'a>(
        storage: &'a mut SqliteStorage,
        tms: &'a MockTmsClient,
        provider: &'a FileContentProvider,
    ) -> SyncEngine<'a, MockTmsClient> {
        SyncEngine::new(storage, tms, provider, "en", &locales(), "test")
    }

    fn notification(document_id: &str, kind: NotificationType) -> Notification {
        Notification {
            project_id: "proj-1".to_string(),
            document_id: document_id.to_string(),
            kind,
            locale: None,
            complete: None,
            progress: None,
            deleted_by: None,
            timestamp: None,
        }
    }

    fn remote_of(engine: &SyncEngine<'_, MockTmsClient>) -> String {
        engine
            .storage()
            .get_document(GUIDE)
            .unwrap()
            .unwrap()
            .remote_id
            .unwrap()
    }

    #[test]
    fn test_unknown_document_is_reported_not_thrown() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);

        let n = notification("rem-ghost", NotificationType::DocumentUploaded);
        let outcome = engine.apply_notification(&n).unwrap();
        assert!(outcome.messages[0].contains("document not found"));
        assert!(outcome.request_translations.is_empty());
        assert!(!outcome.download);
    }

    #[test]
    fn test_uploaded_complete_flips_importing_to_current() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::DocumentUploaded);
        n.complete = Some(true);
        engine.apply_notification(&n).unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Current);
        assert!(doc.last_uploaded_at.is_some());
        // Targets promoted for every enabled locale.
        assert_eq!(engine.storage().list_targets(&doc.id).unwrap().len(), 2);
    }

    #[test]
    fn test_uploaded_incomplete_stays_importing() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::DocumentUploaded);
        n.complete = Some(false);
        engine.apply_notification(&n).unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Importing);
    }

    #[test]
    fn test_uploaded_complete_auto_requests_eligible_targets() {
        let (_dir, mut storage, tms, provider) = fixture();
        let profile = Profile::new("autos").with_flags(false, true, false);
        storage.create_profile(&profile, "test").unwrap();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        {
            let mut doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
            engine
                .storage
                .set_document_profile(&mut doc, Some(&profile.id), "test")
                .unwrap();
        }
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::DocumentUploaded);
        n.complete = Some(true);
        let outcome = engine.apply_notification(&n).unwrap();

        assert_eq!(outcome.request_translations, vec!["de", "es"]);
        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        for locale in ["de", "es"] {
            let target = engine.storage().get_target(&doc.id, locale).unwrap().unwrap();
            assert_eq!(target.status, TargetStatus::Pending);
            assert!(target.requested);
        }
    }

    #[test]
    fn test_import_failure_rolls_back_remote_id() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        let first_remote = remote_of(&engine);

        // An update attempt rotated the remote id TMS-side.
        tms.script_update(Err(TmsError::DocumentLocked {
            new_remote_id: "rem-v2".into(),
        }));
        let _ = engine.update(GUIDE).unwrap_err();
        assert_eq!(remote_of(&engine), "rem-v2");

        // The import of the new version fails: roll back to the prior
        // id, not the failed new one.
        let n = notification("rem-v2", NotificationType::ImportFailure);
        engine.apply_notification(&n).unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Error);
        assert_eq!(doc.remote_id.as_deref(), Some(first_remote.as_str()));
        assert_eq!(doc.previous_remote_id, None);
    }

    #[test]
    fn test_import_failure_on_first_upload_resets_to_untracked() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        let remote = remote_of(&engine);

        let n = notification(&remote, NotificationType::ImportFailure);
        engine.apply_notification(&n).unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Untracked);
        assert!(doc.remote_id.is_none());
    }

    #[test]
    fn test_archived_resets_source_and_pending_targets() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        engine.request_translation(GUIDE, "es").unwrap();
        let remote = remote_of(&engine);

        let n = notification(&remote, NotificationType::DocumentArchived);
        engine.apply_notification(&n).unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Untracked);
        assert!(doc.remote_id.is_none());
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Untracked);
        assert!(!es.requested);
    }

    #[test]
    fn test_cancelled_forces_all_targets_cancelled() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        engine.request_translation(GUIDE, "es").unwrap();
        let remote = remote_of(&engine);

        let n = notification(&remote, NotificationType::DocumentCancelled);
        engine.apply_notification(&n).unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Cancelled);
        // Cancelled keeps the remote id known; deletion clears it.
        assert!(doc.remote_id.is_some());
        for target in engine.storage().list_targets(&doc.id).unwrap() {
            assert_eq!(target.status, TargetStatus::Cancelled);
            assert!(!target.requested);
        }
    }

    #[test]
    fn test_deleted_clears_remote_id() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::DocumentDeleted);
        n.deleted_by = Some("pm@example.com".to_string());
        let outcome = engine.apply_notification(&n).unwrap();
        assert!(outcome.messages[0].contains("pm@example.com"));

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Untracked);
        assert!(doc.remote_id.is_none());
    }

    #[test]
    fn test_target_complete_without_auto_download_is_ready() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        engine.request_translation(GUIDE, "es").unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::Target);
        n.locale = Some("es".to_string());
        n.complete = Some(true);
        let outcome = engine.apply_notification(&n).unwrap();
        assert!(!outcome.download);

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Ready);

        // Explicit download completes the chain.
        engine.download(GUIDE, "es").unwrap();
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Current);
    }

    #[test]
    fn test_target_complete_with_auto_download_goes_current() {
        let (dir, mut storage, tms, provider) = fixture();
        let profile = Profile::new("autos").with_flags(false, false, true);
        storage.create_profile(&profile, "test").unwrap();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        {
            let mut doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
            engine
                .storage
                .set_document_profile(&mut doc, Some(&profile.id), "test")
                .unwrap();
        }
        engine.request_translation(GUIDE, "es").unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::Target);
        n.locale = Some("es".to_string());
        n.complete = Some(true);
        let outcome = engine.apply_notification(&n).unwrap();
        assert!(outcome.download);

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Current);
        assert!(dir.path().join("translations/es").join(GUIDE).is_file());
    }

    #[test]
    fn test_target_auto_download_failure_marks_error() {
        let (_dir, mut storage, tms, provider) = fixture();
        let profile = Profile::new("autos").with_flags(false, false, true);
        storage.create_profile(&profile, "test").unwrap();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        {
            let mut doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
            engine
                .storage
                .set_document_profile(&mut doc, Some(&profile.id), "test")
                .unwrap();
        }
        engine.request_translation(GUIDE, "es").unwrap();
        let remote = remote_of(&engine);

        tms.script_download(Err(TmsError::Generic("disk full".into())));
        let mut n = notification(&remote, NotificationType::Target);
        n.locale = Some("es".to_string());
        n.complete = Some(true);
        let outcome = engine.apply_notification(&n).unwrap();
        assert!(!outcome.download);

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Error);
    }

    #[test]
    fn test_lower_progress_never_regresses_downloaded_target() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        engine.request_translation(GUIDE, "es").unwrap();
        engine.check_target(GUIDE, "es").unwrap();
        engine.download(GUIDE, "es").unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::Target);
        n.locale = Some("es".to_string());
        n.complete = Some(false);
        n.progress = Some(10);
        engine.apply_notification(&n).unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Current);
    }

    #[test]
    fn test_target_deleted_and_cancelled_reset_requested() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        engine.check_upload(GUIDE).unwrap();
        engine.request_translation(GUIDE, "es").unwrap();
        engine.request_translation(GUIDE, "de").unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::TargetDeleted);
        n.locale = Some("es".to_string());
        engine.apply_notification(&n).unwrap();

        let mut n = notification(&remote, NotificationType::TargetCancelled);
        n.locale = Some("de".to_string());
        engine.apply_notification(&n).unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        let de = engine.storage().get_target(&doc.id, "de").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Untracked);
        assert_eq!(de.status, TargetStatus::Cancelled);

        // Neither can be resurrected by a bulk check.
        engine.check_all_translations(GUIDE).unwrap();
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        let de = engine.storage().get_target(&doc.id, "de").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Untracked);
        assert_eq!(de.status, TargetStatus::Cancelled);
    }

    #[test]
    fn test_stale_notification_is_skipped() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        let remote = remote_of(&engine);

        let mut fresh = notification(&remote, NotificationType::DocumentUploaded);
        fresh.complete = Some(true);
        fresh.timestamp = Some(2_000);
        engine.apply_notification(&fresh).unwrap();

        // An older cancellation delivered late must not clobber the
        // newer import confirmation.
        let mut stale = notification(&remote, NotificationType::DocumentCancelled);
        stale.timestamp = Some(1_000);
        let outcome = engine.apply_notification(&stale).unwrap();
        assert!(outcome.messages[0].contains("stale"));

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Current);
        assert_eq!(doc.last_event_at, Some(2_000));
    }

    #[test]
    fn test_untimestamped_notifications_always_apply() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        let remote = remote_of(&engine);

        let mut first = notification(&remote, NotificationType::DocumentUploaded);
        first.complete = Some(true);
        first.timestamp = Some(5_000);
        engine.apply_notification(&first).unwrap();

        let n = notification(&remote, NotificationType::DocumentCancelled);
        engine.apply_notification(&n).unwrap();
        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Cancelled);
    }

    #[test]
    fn test_dispatch_filters_foreign_project() {
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);
        engine.upload(GUIDE).unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::DocumentCancelled);
        n.project_id = "someone-elses-project".to_string();
        let outcome = dispatch(&mut engine, &n, Some("proj-1")).unwrap();
        assert!(outcome.messages[0].contains("foreign project"));

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Importing);
    }

    #[test]
    fn test_progress_scenario_full_lifecycle() {
        // Never uploaded → upload → importing → webhook complete →
        // current → request es → pending → webhook target complete →
        // ready → download → current.
        let (_dir, mut storage, tms, provider) = fixture();
        let mut engine = engine(&mut storage, &tms, &provider);

        engine.upload(GUIDE).unwrap();
        let remote = remote_of(&engine);

        let mut n = notification(&remote, NotificationType::DocumentUploaded);
        n.complete = Some(true);
        engine.apply_notification(&n).unwrap();

        engine.request_translation(GUIDE, "es").unwrap();

        let mut n = notification(&remote, NotificationType::Target);
        n.locale = Some("es".to_string());
        n.complete = Some(true);
        engine.apply_notification(&n).unwrap();

        engine.download(GUIDE, "es").unwrap();

        let doc = engine.storage().get_document(GUIDE).unwrap().unwrap();
        assert_eq!(doc.source_status, SourceStatus::Current);
        let es = engine.storage().get_target(&doc.id, "es").unwrap().unwrap();
        assert_eq!(es.status, TargetStatus::Current);
    }
}
