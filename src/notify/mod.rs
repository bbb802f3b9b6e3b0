//! Inbound webhook notifications.
//!
//! Parses TMS webhook payloads into typed events, routes them through
//! the engine, and shapes the caller-facing response. Dispatch always
//! succeeds at this layer: an unknown document, a foreign project id, or
//! a stale payload is a reported no-op, never an error, so the TMS does
//! not treat the host as unreachable.

use serde::{Deserialize, Serialize};

use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::tms::TmsClient;

/// The fixed vocabulary of inbound notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    DocumentUploaded,
    DocumentUpdated,
    DocumentDeleted,
    DocumentCancelled,
    DocumentArchived,
    Target,
    TargetDeleted,
    TargetCancelled,
    ImportFailure,
}

/// A parsed webhook notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// TMS project the event belongs to.
    pub project_id: String,

    /// Remote document id the event is keyed by.
    pub document_id: String,

    /// Event type.
    #[serde(rename = "type")]
    pub kind: NotificationType,

    /// Locale, for target-scoped events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Completion flag for document_uploaded / target events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,

    /// Progress percentage for target events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,

    /// Who deleted the document, for document_deleted events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,

    /// Event issuance timestamp (Unix milliseconds). Used to skip
    /// payloads delivered out of order; absent means "apply".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Notification {
    /// Parse a notification from raw JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPayload` on malformed JSON or an unknown
    /// event type.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::InvalidPayload(e.to_string()))
    }
}

/// Structured result of applying one notification.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DispatchOutcome {
    /// Locales for which an auto-request continuation was issued.
    pub request_translations: Vec<String>,
    /// Whether an auto-download was performed.
    pub download: bool,
    /// Human-readable summary lines.
    pub messages: Vec<String>,
}

impl DispatchOutcome {
    /// A no-op outcome with a single message.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            messages: vec![text.into()],
            ..Self::default()
        }
    }
}

/// Wire shape of the webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub result: WebhookResult,
    pub messages: Vec<String>,
}

/// The `result` object inside a webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResult {
    pub request_translations: Vec<String>,
    pub download: bool,
}

impl From<DispatchOutcome> for WebhookResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            result: WebhookResult {
                request_translations: outcome.request_translations,
                download: outcome.download,
            },
            messages: outcome.messages,
        }
    }
}

/// Dispatch a notification through the engine.
///
/// `expected_project` filters out payloads for foreign projects; they
/// are reported no-ops, mirroring the unknown-document rule.
///
/// # Errors
///
/// Returns an error only on local storage failure; every remote-state
/// condition is reported through the outcome instead.
pub fn dispatch<C: TmsClient>(
    engine: &mut SyncEngine<'_, C>,
    notification: &Notification,
    expected_project: Option<&str>,
) -> Result<DispatchOutcome> {
    if let Some(expected) = expected_project {
        if notification.project_id != expected {
            return Ok(DispatchOutcome::message(format!(
                "ignoring notification for foreign project '{}'",
                notification.project_id
            )));
        }
    }

    engine.apply_notification(notification)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_notification() {
        let raw = r#"{
            "project_id": "proj-1",
            "document_id": "rem-42",
            "type": "target",
            "locale": "es",
            "complete": true,
            "progress": 100
        }"#;

        let n = Notification::from_json(raw).unwrap();
        assert_eq!(n.kind, NotificationType::Target);
        assert_eq!(n.locale.as_deref(), Some("es"));
        assert_eq!(n.complete, Some(true));
        assert_eq!(n.timestamp, None);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let raw = r#"{"project_id": "p", "document_id": "d", "type": "document_exploded"}"#;
        assert!(matches!(
            Notification::from_json(raw),
            Err(Error::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_response_shape() {
        let outcome = DispatchOutcome {
            request_translations: vec!["de".into()],
            download: true,
            messages: vec!["ok".into()],
        };
        let response = WebhookResponse::from(outcome);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"]["request_translations"][0], "de");
        assert_eq!(json["result"]["download"], true);
        assert_eq!(json["messages"][0], "ok");
    }
}
