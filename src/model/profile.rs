//! Automation profiles and policy resolution.
//!
//! A profile holds the global auto-upload/request/download flags plus
//! per-locale overrides. `policy_for` is a pure function and is
//! recomputed at every decision point rather than cached on documents,
//! so profile edits take effect on the next event without migration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-locale override inside a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageOverride {
    /// The locale is fully disabled, regardless of global flags.
    Disabled,
    /// Custom automation flags for this locale; `None` falls back to the
    /// profile's global flag.
    Custom {
        auto_request: Option<bool>,
        auto_download: Option<bool>,
    },
}

/// A named automation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier (e.g. "prof_1a2b3c4d5e6f").
    pub id: String,

    /// Human-readable unique name.
    pub name: String,

    /// Automatically re-send local edits without user action.
    pub auto_upload: bool,

    /// Automatically request translations when targets become eligible.
    pub auto_request: bool,

    /// Automatically download completed translations.
    pub auto_download: bool,

    /// Locale → override. Ordered for stable display.
    pub language_overrides: BTreeMap<String, LanguageOverride>,

    /// Creation timestamp (Unix milliseconds).
    pub created_at: i64,

    /// Last mutation timestamp (Unix milliseconds).
    pub updated_at: i64,
}

/// Resolved automation policy for one (document, locale) decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectivePolicy {
    pub disabled: bool,
    pub auto_request: bool,
    pub auto_download: bool,
}

impl Profile {
    /// Create a new all-manual profile.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let id = format!("prof_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
        Self {
            id,
            name: name.to_string(),
            auto_upload: false,
            auto_request: false,
            auto_download: false,
            language_overrides: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The system default policy used when a document has no profile:
    /// everything manual, no overrides.
    #[must_use]
    pub fn system_default() -> Self {
        let mut profile = Self::new("default");
        profile.id = "prof_default".to_string();
        profile
    }

    /// Set the global automation flags.
    #[must_use]
    pub fn with_flags(mut self, auto_upload: bool, auto_request: bool, auto_download: bool) -> Self {
        self.auto_upload = auto_upload;
        self.auto_request = auto_request;
        self.auto_download = auto_download;
        self
    }

    /// Add a per-locale override.
    #[must_use]
    pub fn with_override(mut self, locale: &str, ov: LanguageOverride) -> Self {
        self.language_overrides.insert(locale.to_string(), ov);
        self
    }

    /// Resolve the effective policy for one locale.
    ///
    /// Pure: reads only the profile. A disabled override wins over
    /// everything; a custom override falls back per-flag to the globals.
    #[must_use]
    pub fn policy_for(&self, locale: &str) -> EffectivePolicy {
        match self.language_overrides.get(locale) {
            Some(LanguageOverride::Disabled) => EffectivePolicy {
                disabled: true,
                auto_request: false,
                auto_download: false,
            },
            Some(LanguageOverride::Custom {
                auto_request,
                auto_download,
            }) => EffectivePolicy {
                disabled: false,
                auto_request: auto_request.unwrap_or(self.auto_request),
                auto_download: auto_download.unwrap_or(self.auto_download),
            },
            None => EffectivePolicy {
                disabled: false,
                auto_request: self.auto_request,
                auto_download: self.auto_download,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_default_is_all_manual() {
        let profile = Profile::system_default();
        let policy = profile.policy_for("de");
        assert!(!policy.disabled);
        assert!(!policy.auto_request);
        assert!(!policy.auto_download);
        assert!(!profile.auto_upload);
    }

    #[test]
    fn test_disabled_override_wins_over_globals() {
        let profile = Profile::new("autos")
            .with_flags(true, true, true)
            .with_override("fr", LanguageOverride::Disabled);

        let policy = profile.policy_for("fr");
        assert!(policy.disabled);
        assert!(!policy.auto_request);
        assert!(!policy.auto_download);

        // Other locales keep the globals.
        let policy = profile.policy_for("de");
        assert!(!policy.disabled);
        assert!(policy.auto_request);
        assert!(policy.auto_download);
    }

    #[test]
    fn test_custom_override_falls_back_per_flag() {
        let profile = Profile::new("mixed").with_flags(false, true, false).with_override(
            "es",
            LanguageOverride::Custom {
                auto_request: None,
                auto_download: Some(true),
            },
        );

        let policy = profile.policy_for("es");
        assert!(!policy.disabled);
        assert!(policy.auto_request, "unset flag falls back to global");
        assert!(policy.auto_download, "set flag overrides global");
    }

    #[test]
    fn test_policy_recomputes_after_edit() {
        let mut profile = Profile::new("editable");
        assert!(!profile.policy_for("de").auto_request);

        profile.auto_request = true;
        assert!(profile.policy_for("de").auto_request);
    }
}
