//! Synchronization engine.
//!
//! The state machine core: accepts user/batch commands (upload, update,
//! check-upload, request, check-target, download, check-all, refresh)
//! and inbound webhook events, applies the lifecycle transitions, and
//! issues outbound calls through the TMS client port.
//!
//! Every command is idempotent and safe to invoke redundantly. The
//! engine never retries a TMS call; a failed command is retried by
//! re-invoking it. The one invariant everything here bends around:
//! a CURRENT/READY target is never regressed by less-authoritative
//! information, no matter the order signals arrive in.

mod notifications;

use serde::Serialize;
use tracing::{debug, info};

use crate::content::ContentProvider;
use crate::error::{Error, Result};
use crate::model::{Document, SourceStatus, TargetStatus};
use crate::storage::events::{insert_event, Event, EventType};
use crate::storage::SqliteStorage;
use crate::tms::{TmsClient, TmsError};
use crate::validate;

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Result summary of one engine command.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CommandOutcome {
    /// False when the command was a reported no-op.
    pub performed: bool,
    /// Human-readable summary lines.
    pub messages: Vec<String>,
}

impl CommandOutcome {
    fn noop(message: impl Into<String>) -> Self {
        Self {
            performed: false,
            messages: vec![message.into()],
        }
    }

    fn done(message: impl Into<String>) -> Self {
        Self {
            performed: true,
            messages: vec![message.into()],
        }
    }
}

/// Computed (lazily materialized) view of one target at query time.
#[derive(Debug, Clone, Serialize)]
pub struct TargetView {
    pub locale: String,
    pub status: TargetStatus,
    pub requested: bool,
}

/// The synchronization engine.
///
/// Holds the registry, the TMS port, and the content capability for the
/// duration of one command or dispatch. All mutations for one document
/// are serialized through the storage connection.
pub struct SyncEngine<'a, C: TmsClient> {
    storage: &'a mut SqliteStorage,
    tms: &'a C,
    content: &'a dyn ContentProvider,
    source_locale: String,
    enabled_locales: Vec<String>,
    actor: String,
}

impl<'a, C: TmsClient> SyncEngine<'a, C> {
    /// Create an engine over the given collaborators.
    pub fn new(
        storage: &'a mut SqliteStorage,
        tms: &'a C,
        content: &'a dyn ContentProvider,
        source_locale: &str,
        enabled_locales: &[String],
        actor: &str,
    ) -> Self {
        Self {
            storage,
            tms,
            content,
            source_locale: source_locale.to_string(),
            enabled_locales: enabled_locales.to_vec(),
            actor: actor.to_string(),
        }
    }

    /// Borrow the underlying storage (status queries after commands).
    #[must_use]
    pub fn storage(&self) -> &SqliteStorage {
        self.storage
    }

    fn locale_enabled(&self, locale: &str) -> bool {
        self.enabled_locales.iter().any(|l| l == locale)
    }

    fn require_document(&self, local_ref: &str) -> Result<Document> {
        self.storage
            .get_document(local_ref)?
            .ok_or_else(|| Error::DocumentNotFound {
                local_ref: local_ref.to_string(),
            })
    }

    // ── Commands ──────────────────────────────────────────────

    /// Upload a document's source content for the first time (or retry
    /// after a failure).
    ///
    /// Requires the source to be untracked or in error. A reference the
    /// content provider does not consider translatable is a reported
    /// no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns a TMS error when the outbound call fails; the source is
    /// marked in error only when a remote id already exists (a document
    /// without one stays untracked so the tracked-iff-remote invariant
    /// holds).
    pub fn upload(&mut self, local_ref: &str) -> Result<CommandOutcome> {
        if !self.content.is_translatable(local_ref) {
            return Ok(CommandOutcome::noop(format!(
                "translation is not configured for '{local_ref}'"
            )));
        }

        let kind = self.content.kind_of(local_ref);
        let mut doc = self.storage.get_or_create_document(
            local_ref,
            kind,
            &self.source_locale,
            &self.actor,
        )?;

        if !doc.source_status.can_upload() {
            return Err(Error::InvalidSourceState {
                expected: "untracked or error".into(),
                actual: doc.source_status.to_string(),
            });
        }

        let source = self.content.load(local_ref)?;

        // An errored document that already has a remote id retries as a
        // re-send on the same id rather than minting a second document.
        let sent = match doc.remote_id.clone() {
            Some(remote_id) => self.tms.update(&remote_id, &source.payload).map(|()| None),
            None => self
                .tms
                .upload(&self.source_locale, &source.payload)
                .map(Some),
        };

        match sent {
            Ok(assigned) => {
                if let Some(remote_id) = assigned {
                    self.storage.set_remote_id(&mut doc, &remote_id, &self.actor)?;
                }
                doc.content_hash = Some(source.hash);
                self.storage.save_document(&doc)?;
                self.storage
                    .set_source_status(&mut doc, SourceStatus::Importing, &self.actor)?;
                info!(local_ref, "upload accepted, import started");
                Ok(CommandOutcome::done(format!(
                    "uploaded '{local_ref}'; import started"
                )))
            }
            Err(err) => {
                self.handle_send_failure(&mut doc, &err)?;
                Err(Error::Tms {
                    op: "upload",
                    source: err,
                })
            }
        }
    }

    /// Re-send a document's content to its existing remote document.
    ///
    /// Stamps `last_updated_at` on success; never on failure.
    ///
    /// # Errors
    ///
    /// Returns a TMS error when the outbound call fails (source marked
    /// in error, or reset/rotated for archived/locked drift).
    pub fn update(&mut self, local_ref: &str) -> Result<CommandOutcome> {
        let mut doc = self.require_document(local_ref)?;
        let Some(remote_id) = doc.remote_id.clone() else {
            return Err(Error::InvalidSourceState {
                expected: "uploaded (remote id assigned)".into(),
                actual: doc.source_status.to_string(),
            });
        };

        let source = self.content.load(local_ref)?;
        match self.tms.update(&remote_id, &source.payload) {
            Ok(()) => {
                doc.content_hash = Some(source.hash);
                doc.last_updated_at = Some(now_millis());
                self.storage.save_document(&doc)?;
                self.storage
                    .set_source_status(&mut doc, SourceStatus::Importing, &self.actor)?;
                info!(local_ref, "update accepted, re-import started");
                Ok(CommandOutcome::done(format!(
                    "updated '{local_ref}'; re-import started"
                )))
            }
            Err(err) => {
                self.handle_send_failure(&mut doc, &err)?;
                Err(Error::Tms {
                    op: "update",
                    source: err,
                })
            }
        }
    }

    /// Re-query remote import progress.
    ///
    /// Only moves IMPORTING to CURRENT; never regresses a current
    /// source. Promotes targets to REQUEST on the first confirmation.
    ///
    /// # Errors
    ///
    /// Returns a TMS error when the check call itself fails.
    pub fn check_upload(&mut self, local_ref: &str) -> Result<CommandOutcome> {
        let mut doc = self.require_document(local_ref)?;
        let Some(remote_id) = doc.remote_id.clone() else {
            return Err(Error::InvalidSourceState {
                expected: "uploaded (remote id assigned)".into(),
                actual: doc.source_status.to_string(),
            });
        };

        if doc.source_status == SourceStatus::Current {
            return Ok(CommandOutcome::noop("source is already current"));
        }

        match self.tms.check_document(&remote_id) {
            Ok(progress) if progress.complete => {
                if doc.source_status == SourceStatus::Importing {
                    self.mark_source_current(&mut doc)?;
                    Ok(CommandOutcome::done("import complete; source is current"))
                } else {
                    Ok(CommandOutcome::noop(format!(
                        "import reported complete, but source is {}",
                        doc.source_status
                    )))
                }
            }
            Ok(progress) => Ok(CommandOutcome::noop(format!(
                "import in progress ({}%)",
                progress.percentage
            ))),
            Err(err) => {
                self.apply_drift(&mut doc, &err)?;
                Err(Error::Tms {
                    op: "check",
                    source: err,
                })
            }
        }
    }

    /// Request translation of one target locale.
    ///
    /// Requires an enabled, non-disabled target and a current source.
    /// An edited source is re-sent first when the profile automates
    /// uploads; otherwise the caller must update explicitly.
    ///
    /// # Errors
    ///
    /// Returns a TMS error on failure. A generic failure leaves the
    /// target untouched: the remote outcome is unknown, and the engine
    /// must not assert a failure it cannot confirm.
    pub fn request_translation(&mut self, local_ref: &str, locale: &str) -> Result<CommandOutcome> {
        let locale = validate::normalize_locale(locale)?;
        let mut doc = self.require_document(local_ref)?;
        let profile = self.storage.effective_profile(&doc)?;
        let policy = profile.policy_for(&locale);

        if !self.locale_enabled(&locale) || policy.disabled {
            return Err(Error::TargetDisabled { locale });
        }

        let mut messages = Vec::new();
        match doc.source_status {
            SourceStatus::Current => {}
            SourceStatus::Edited if profile.auto_upload => {
                self.update(local_ref)?;
                doc = self.require_document(local_ref)?;
                messages.push("local edits re-sent before requesting".to_string());
            }
            SourceStatus::Edited => return Err(Error::SourceEdited),
            other => {
                return Err(Error::InvalidSourceState {
                    expected: "current".into(),
                    actual: other.to_string(),
                })
            }
        }

        let Some(remote_id) = doc.remote_id.clone() else {
            return Err(Error::InvalidSourceState {
                expected: "uploaded (remote id assigned)".into(),
                actual: doc.source_status.to_string(),
            });
        };

        if let Some(target) = self.storage.get_target(&doc.id, &locale)? {
            if !target.status.is_check_movable() || target.status == TargetStatus::Ready {
                return Ok(CommandOutcome::noop(format!(
                    "translation for '{locale}' is already {}",
                    target.status
                )));
            }
        }

        match self.tms.add_target(&remote_id, &locale) {
            Ok(()) => {
                self.storage
                    .set_target_state(&doc.id, &locale, TargetStatus::Pending, true, &self.actor)?;
                messages.push(format!("translation requested for '{locale}'"));
                Ok(CommandOutcome {
                    performed: true,
                    messages,
                })
            }
            Err(err) => {
                match &err {
                    // Unknown outcome: leave the target exactly as it was.
                    TmsError::Generic(_) => {
                        debug!(
                            locale = locale.as_str(),
                            "request outcome unknown, target left unchanged"
                        );
                    }
                    TmsError::PaymentRequired => {
                        self.storage
                            .set_source_status(&mut doc, SourceStatus::Error, &self.actor)?;
                    }
                    TmsError::DocumentArchived => {
                        self.archive_reset(&mut doc)?;
                    }
                    TmsError::DocumentLocked { new_remote_id } => {
                        let was_current = doc.source_status == SourceStatus::Current;
                        self.storage.set_remote_id(&mut doc, new_remote_id, &self.actor)?;
                        if was_current {
                            self.storage
                                .set_source_status(&mut doc, SourceStatus::Edited, &self.actor)?;
                        }
                    }
                }
                Err(Error::Tms {
                    op: "request",
                    source: err,
                })
            }
        }
    }

    /// Re-query translation progress for one target.
    ///
    /// PENDING moves to READY only on confirmed completion; a ready or
    /// downloaded target is never regressed by this check.
    ///
    /// # Errors
    ///
    /// Returns a TMS error when the check call itself fails.
    pub fn check_target(&mut self, local_ref: &str, locale: &str) -> Result<CommandOutcome> {
        let locale = validate::normalize_locale(locale)?;
        let mut doc = self.require_document(local_ref)?;
        let Some(remote_id) = doc.remote_id.clone() else {
            return Err(Error::InvalidSourceState {
                expected: "uploaded (remote id assigned)".into(),
                actual: doc.source_status.to_string(),
            });
        };

        let Some(target) = self.storage.get_target(&doc.id, &locale)? else {
            return Ok(CommandOutcome::noop(format!(
                "'{locale}' has not been requested; nothing to check"
            )));
        };
        if !target.requested {
            return Ok(CommandOutcome::noop(format!(
                "'{locale}' has not been requested; nothing to check"
            )));
        }
        if target.status == TargetStatus::Current {
            return Ok(CommandOutcome::noop(format!(
                "translation for '{locale}' is already downloaded"
            )));
        }

        match self.tms.check_target(&remote_id, &locale) {
            Ok(progress) if progress.complete => {
                if target.status.is_check_movable() && target.status != TargetStatus::Ready {
                    self.storage
                        .set_target_state(&doc.id, &locale, TargetStatus::Ready, true, &self.actor)?;
                }
                Ok(CommandOutcome::done(format!(
                    "translation for '{locale}' is ready for download"
                )))
            }
            Ok(progress) => Ok(CommandOutcome::noop(format!(
                "'{locale}' translation in progress ({}%)",
                progress.percentage
            ))),
            Err(err) => {
                self.apply_drift(&mut doc, &err)?;
                Err(Error::Tms {
                    op: "check",
                    source: err,
                })
            }
        }
    }

    /// Download a ready translation and store it locally.
    ///
    /// # Errors
    ///
    /// Returns a TMS error on failure; unlike request, a download
    /// failure is always confirmable, so the target is marked in error.
    pub fn download(&mut self, local_ref: &str, locale: &str) -> Result<CommandOutcome> {
        let locale = validate::normalize_locale(locale)?;
        let mut doc = self.require_document(local_ref)?;
        let Some(remote_id) = doc.remote_id.clone() else {
            return Err(Error::InvalidSourceState {
                expected: "uploaded (remote id assigned)".into(),
                actual: doc.source_status.to_string(),
            });
        };

        let Some(target) = self.storage.get_target(&doc.id, &locale)? else {
            return Err(Error::TargetNotFound {
                local_ref: local_ref.to_string(),
                locale,
            });
        };

        match target.status {
            TargetStatus::Current => {
                return Ok(CommandOutcome::noop(format!(
                    "translation for '{locale}' is already downloaded"
                )));
            }
            TargetStatus::Ready => {}
            other => {
                return Err(Error::InvalidTargetState {
                    locale,
                    expected: "ready".into(),
                    actual: other.to_string(),
                });
            }
        }

        match self.tms.download_target(&remote_id, &locale) {
            Ok(payload) => {
                self.content.store_translation(local_ref, &locale, &payload)?;
                self.storage
                    .set_target_state(&doc.id, &locale, TargetStatus::Current, true, &self.actor)?;
                insert_event(
                    self.storage.conn(),
                    &Event::new(
                        "target",
                        &format!("{}:{locale}", doc.id),
                        EventType::TranslationStored,
                        &self.actor,
                    )
                    .with_comment(local_ref),
                )?;
                info!(local_ref, locale = locale.as_str(), "translation downloaded");
                Ok(CommandOutcome::done(format!(
                    "downloaded translation for '{locale}'"
                )))
            }
            Err(err) => {
                match &err {
                    TmsError::Generic(_) => {
                        self.storage.set_target_state(
                            &doc.id,
                            &locale,
                            TargetStatus::Error,
                            true,
                            &self.actor,
                        )?;
                    }
                    drift => {
                        self.apply_drift(&mut doc, drift)?;
                    }
                }
                Err(Error::Tms {
                    op: "download",
                    source: err,
                })
            }
        }
    }

    /// Bulk re-check every requested target against TMS-reported
    /// completion percentages.
    ///
    /// A percentage of 100 or more moves the target to READY (download
    /// stays a separate, explicit step); anything lower moves it to
    /// PENDING, except a target already CURRENT, which is preserved
    /// for any reported percentage, including 0. Targets never
    /// requested are left untouched entirely.
    ///
    /// # Errors
    ///
    /// Returns an error only on local storage failure; per-locale check
    /// failures are collected as messages.
    pub fn check_all_translations(&mut self, local_ref: &str) -> Result<CommandOutcome> {
        let mut doc = self.require_document(local_ref)?;
        let Some(remote_id) = doc.remote_id.clone() else {
            return Ok(CommandOutcome::noop("nothing uploaded; nothing to check"));
        };

        let profile = self.storage.effective_profile(&doc)?;
        let targets = self.storage.list_targets(&doc.id)?;
        let mut outcome = CommandOutcome {
            performed: true,
            messages: Vec::new(),
        };

        for target in targets {
            if !target.requested || target.status == TargetStatus::Disabled {
                continue;
            }
            let locale = target.locale.clone();
            if profile.policy_for(&locale).disabled || !self.locale_enabled(&locale) {
                outcome.messages.push(format!("'{locale}' is disabled; skipped"));
                continue;
            }

            match self.tms.check_target(&remote_id, &locale) {
                Ok(progress) => {
                    if !target.status.is_check_movable() {
                        outcome.messages.push(format!(
                            "'{locale}' already downloaded; kept current"
                        ));
                        continue;
                    }
                    if progress.percentage >= 100 {
                        self.storage.set_target_state(
                            &doc.id,
                            &locale,
                            TargetStatus::Ready,
                            true,
                            &self.actor,
                        )?;
                        outcome
                            .messages
                            .push(format!("'{locale}' ready for download"));
                    } else {
                        self.storage.set_target_state(
                            &doc.id,
                            &locale,
                            TargetStatus::Pending,
                            true,
                            &self.actor,
                        )?;
                        outcome.messages.push(format!(
                            "'{locale}' in progress ({}%)",
                            progress.percentage
                        ));
                    }
                }
                Err(TmsError::Generic(msg)) => {
                    outcome
                        .messages
                        .push(format!("check failed for '{locale}': {msg}"));
                }
                Err(err) => {
                    self.apply_drift(&mut doc, &err)?;
                    outcome.messages.push(format!("'{locale}': {err}"));
                    if matches!(err, TmsError::DocumentArchived) {
                        // The whole document was reset; no point checking on.
                        break;
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Detect local edits by content hash and apply auto-upload policy.
    ///
    /// A current source whose content changed becomes EDITED; with
    /// `auto_upload` resolved true the re-send happens immediately, the
    /// way a host save-hook would drive it.
    ///
    /// # Errors
    ///
    /// Returns a TMS error if an automated re-send fails.
    pub fn refresh(&mut self, local_ref: &str) -> Result<CommandOutcome> {
        let Some(mut doc) = self.storage.get_document(local_ref)? else {
            if self.content.is_translatable(local_ref) {
                return Ok(CommandOutcome::noop(format!(
                    "'{local_ref}' is not tracked; run `locsync document upload {local_ref}`"
                )));
            }
            return Ok(CommandOutcome::noop(format!(
                "translation is not configured for '{local_ref}'"
            )));
        };
        let profile = self.storage.effective_profile(&doc)?;

        match doc.source_status {
            SourceStatus::Current => {
                let source = self.content.load(local_ref)?;
                if doc.content_hash.as_deref() == Some(source.hash.as_str()) {
                    return Ok(CommandOutcome::noop("no local changes"));
                }
                self.storage
                    .set_source_status(&mut doc, SourceStatus::Edited, &self.actor)?;
                if profile.auto_upload {
                    let mut outcome = self.update(local_ref)?;
                    outcome
                        .messages
                        .insert(0, "local edits detected".to_string());
                    return Ok(outcome);
                }
                Ok(CommandOutcome::done("local edits detected; source marked edited"))
            }
            SourceStatus::Edited if profile.auto_upload => self.update(local_ref),
            SourceStatus::Edited => Ok(CommandOutcome::noop(
                "source has local edits; run `locsync document update` to re-send",
            )),
            SourceStatus::Untracked if profile.auto_upload => self.upload(local_ref),
            other => Ok(CommandOutcome::noop(format!("source is {other}; nothing to do"))),
        }
    }

    /// Compute the lazily-materialized target view for every enabled
    /// locale plus every persisted row.
    ///
    /// Disabled languages always show DISABLED regardless of prior
    /// status; a re-enabled language recomputes from the first-CURRENT
    /// rule.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn effective_targets(&self, doc: &Document) -> Result<Vec<TargetView>> {
        let profile = self.storage.effective_profile(doc)?;
        let rows = self.storage.list_targets(&doc.id)?;

        let mut locales: Vec<String> = self.enabled_locales.clone();
        for row in &rows {
            if !locales.contains(&row.locale) {
                locales.push(row.locale.clone());
            }
        }
        locales.sort();

        let default_status = if matches!(
            doc.source_status,
            SourceStatus::Current | SourceStatus::Edited
        ) {
            TargetStatus::Request
        } else {
            TargetStatus::Untracked
        };

        let mut views = Vec::with_capacity(locales.len());
        for locale in locales {
            let row = rows.iter().find(|t| t.locale == locale);
            let disabled =
                !self.locale_enabled(&locale) || profile.policy_for(&locale).disabled;
            let (status, requested) = if disabled {
                (TargetStatus::Disabled, row.is_some_and(|t| t.requested))
            } else {
                match row {
                    // Re-enabled: recompute from the first-CURRENT rule.
                    Some(t) if t.status == TargetStatus::Disabled => (default_status, false),
                    Some(t) => (t.status, t.requested),
                    None => (default_status, false),
                }
            };
            views.push(TargetView {
                locale,
                status,
                requested,
            });
        }
        Ok(views)
    }

    // ── Shared transition helpers ─────────────────────────────

    /// Flip the source to CURRENT, stamp the first-upload timestamp,
    /// and promote targets. Returns the newly REQUEST-eligible locales.
    fn mark_source_current(&mut self, doc: &mut Document) -> Result<Vec<String>> {
        self.storage
            .set_source_status(doc, SourceStatus::Current, &self.actor)?;
        if doc.last_uploaded_at.is_none() {
            doc.last_uploaded_at = Some(now_millis());
            self.storage.save_document(doc)?;
        }
        self.promote_targets(doc)
    }

    /// Materialize targets for every enabled locale now that the source
    /// is current. Returns locales that just became REQUEST-eligible.
    fn promote_targets(&mut self, doc: &Document) -> Result<Vec<String>> {
        let profile = self.storage.effective_profile(doc)?;
        let mut newly_eligible = Vec::new();

        for locale in self.enabled_locales.clone() {
            let policy = profile.policy_for(&locale);
            let existing = self.storage.get_target(&doc.id, &locale)?;

            if policy.disabled {
                let requested = existing.as_ref().is_some_and(|t| t.requested);
                self.storage.set_target_state(
                    &doc.id,
                    &locale,
                    TargetStatus::Disabled,
                    requested,
                    &self.actor,
                )?;
                continue;
            }

            match existing {
                None => {
                    self.storage.set_target_state(
                        &doc.id,
                        &locale,
                        TargetStatus::Request,
                        false,
                        &self.actor,
                    )?;
                    newly_eligible.push(locale);
                }
                Some(t)
                    if matches!(t.status, TargetStatus::Untracked | TargetStatus::Disabled) =>
                {
                    self.storage.set_target_state(
                        &doc.id,
                        &locale,
                        TargetStatus::Request,
                        false,
                        &self.actor,
                    )?;
                    newly_eligible.push(locale);
                }
                Some(_) => {}
            }
        }
        Ok(newly_eligible)
    }

    /// Full local reset after the TMS invalidated the remote document
    /// (archived or deleted): source UNTRACKED, ids cleared, every
    /// target back to UNTRACKED so requests are redone after re-upload.
    fn archive_reset(&mut self, doc: &mut Document) -> Result<()> {
        doc.remote_id = None;
        doc.previous_remote_id = None;
        self.storage.save_document(doc)?;
        self.storage
            .set_source_status(doc, SourceStatus::Untracked, &self.actor)?;
        for target in self.storage.list_targets(&doc.id)? {
            self.storage.set_target_state(
                &doc.id,
                &target.locale,
                TargetStatus::Untracked,
                false,
                &self.actor,
            )?;
        }
        Ok(())
    }

    /// Upload/update failure handling: a confirmed failure marks the
    /// source in error, but only once a remote id exists: a document
    /// whose first upload failed stays untracked.
    fn handle_send_failure(&mut self, doc: &mut Document, err: &TmsError) -> Result<()> {
        match err {
            TmsError::Generic(_) | TmsError::PaymentRequired => {
                if doc.remote_id.is_some() {
                    self.storage
                        .set_source_status(doc, SourceStatus::Error, &self.actor)?;
                }
                Ok(())
            }
            _ => self.apply_drift(doc, err),
        }
    }

    /// State-drift corrections shared by every command: archived and
    /// locked are required local resets/retries, not errors; payment
    /// failures are always source-scoped.
    fn apply_drift(&mut self, doc: &mut Document, err: &TmsError) -> Result<()> {
        match err {
            TmsError::Generic(_) => Ok(()),
            TmsError::PaymentRequired => {
                if doc.remote_id.is_some() {
                    self.storage
                        .set_source_status(doc, SourceStatus::Error, &self.actor)?;
                }
                Ok(())
            }
            TmsError::DocumentArchived => self.archive_reset(doc),
            TmsError::DocumentLocked { new_remote_id } => {
                let was_current = doc.source_status == SourceStatus::Current;
                self.storage.set_remote_id(doc, new_remote_id, &self.actor)?;
                if was_current {
                    self.storage
                        .set_source_status(doc, SourceStatus::Edited, &self.actor)?;
                }
                Ok(())
            }
        }
    }
}
