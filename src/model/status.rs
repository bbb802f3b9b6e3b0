//! Source and target status vocabularies.
//!
//! Both lifecycles are closed enums; unknown states are rejected at parse
//! time rather than leaking into the database as free-form strings. The
//! authoritative transition rules live in the engine; this module only
//! defines the vocabulary, storage codecs, and the monotonic-regression
//! guard used when reconciling out-of-order signals.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a document's source content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// Never uploaded, or fully reset. The only status without a remote id.
    Untracked,
    /// Uploaded (or re-sent) and awaiting import confirmation from the TMS.
    Importing,
    /// Remote copy matches the last-sent local content.
    Current,
    /// Local content changed since the last successful upload/update.
    Edited,
    /// A confirmable TMS failure; retry the triggering command to clear.
    Error,
    /// Cancelled on the TMS side. The remote id stays known.
    Cancelled,
}

impl SourceStatus {
    /// String representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Untracked => "untracked",
            Self::Importing => "importing",
            Self::Current => "current",
            Self::Edited => "edited",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from a storage string. Unknown input is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "untracked" => Some(Self::Untracked),
            "importing" => Some(Self::Importing),
            "current" => Some(Self::Current),
            "edited" => Some(Self::Edited),
            "error" => Some(Self::Error),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether an upload may be issued from this status.
    #[must_use]
    pub const fn can_upload(&self) -> bool {
        matches!(self, Self::Untracked | Self::Error)
    }
}

impl Default for SourceStatus {
    fn default() -> Self {
        Self::Untracked
    }
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of one target language of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// No translation activity for this locale.
    Untracked,
    /// Source is current and the locale is enabled; ready to be requested.
    Request,
    /// Translation requested and in progress remotely.
    Pending,
    /// Translation complete remotely, not yet downloaded.
    Ready,
    /// Translation downloaded and stored locally.
    Current,
    /// Local copy of the translation was edited.
    Edited,
    /// A confirmable download failure.
    Error,
    /// Cancelled remotely; must be re-requested.
    Cancelled,
    /// The locale is disabled by profile or project settings.
    Disabled,
}

impl TargetStatus {
    /// String representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Untracked => "untracked",
            Self::Request => "request",
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Current => "current",
            Self::Edited => "edited",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
            Self::Disabled => "disabled",
        }
    }

    /// Parse from a storage string. Unknown input is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "untracked" => Some(Self::Untracked),
            "request" => Some(Self::Request),
            "pending" => Some(Self::Pending),
            "ready" => Some(Self::Ready),
            "current" => Some(Self::Current),
            "edited" => Some(Self::Edited),
            "error" => Some(Self::Error),
            "cancelled" => Some(Self::Cancelled),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    /// Whether a completion/progress check may move this target.
    ///
    /// CURRENT (and locally EDITED) targets hold authoritative local
    /// state: a remotely-reported percentage, however low, must never
    /// regress them. This is the single most important invariant when
    /// notifications and commands race.
    #[must_use]
    pub const fn is_check_movable(&self) -> bool {
        !matches!(self, Self::Current | Self::Edited)
    }
}

impl Default for TargetStatus {
    fn default() -> Self {
        Self::Untracked
    }
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_status_round_trip() {
        for status in [
            SourceStatus::Untracked,
            SourceStatus::Importing,
            SourceStatus::Current,
            SourceStatus::Edited,
            SourceStatus::Error,
            SourceStatus::Cancelled,
        ] {
            assert_eq!(SourceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SourceStatus::parse("bogus"), None);
    }

    #[test]
    fn test_target_status_round_trip() {
        for status in [
            TargetStatus::Untracked,
            TargetStatus::Request,
            TargetStatus::Pending,
            TargetStatus::Ready,
            TargetStatus::Current,
            TargetStatus::Edited,
            TargetStatus::Error,
            TargetStatus::Cancelled,
            TargetStatus::Disabled,
        ] {
            assert_eq!(TargetStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TargetStatus::parse(""), None);
    }

    #[test]
    fn test_upload_requires_untracked_or_error() {
        assert!(SourceStatus::Untracked.can_upload());
        assert!(SourceStatus::Error.can_upload());
        assert!(!SourceStatus::Current.can_upload());
        assert!(!SourceStatus::Importing.can_upload());
        assert!(!SourceStatus::Edited.can_upload());
    }

    #[test]
    fn test_current_target_is_not_check_movable() {
        assert!(!TargetStatus::Current.is_check_movable());
        assert!(!TargetStatus::Edited.is_check_movable());
        assert!(TargetStatus::Pending.is_check_movable());
        assert!(TargetStatus::Ready.is_check_movable());
    }
}
