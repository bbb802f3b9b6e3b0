//! Error types for the locsync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Retryability flags (every TMS failure is retryable by re-issuing
//!   the same command)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::tms::TmsError;

/// Result type alias for locsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string; shells on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    DocumentNotFound,
    TargetNotFound,
    ProfileNotFound,

    // Validation (exit 4)
    InvalidLocale,
    InvalidArgument,
    InvalidPayload,

    // State (exit 5)
    InvalidSourceState,
    InvalidTargetState,
    TargetDisabled,
    SourceEdited,

    // TMS (exit 6)
    TmsUploadFailed,
    TmsUpdateFailed,
    TmsRequestFailed,
    TmsDownloadFailed,
    TmsCheckFailed,
    PaymentRequired,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            Self::TargetNotFound => "TARGET_NOT_FOUND",
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::InvalidLocale => "INVALID_LOCALE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::InvalidSourceState => "INVALID_SOURCE_STATE",
            Self::InvalidTargetState => "INVALID_TARGET_STATE",
            Self::TargetDisabled => "TARGET_DISABLED",
            Self::SourceEdited => "SOURCE_EDITED",
            Self::TmsUploadFailed => "TMS_UPLOAD_FAILED",
            Self::TmsUpdateFailed => "TMS_UPDATE_FAILED",
            Self::TmsRequestFailed => "TMS_REQUEST_FAILED",
            Self::TmsDownloadFailed => "TMS_DOWNLOAD_FAILED",
            Self::TmsCheckFailed => "TMS_CHECK_FAILED",
            Self::PaymentRequired => "PAYMENT_REQUIRED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::DocumentNotFound | Self::TargetNotFound | Self::ProfileNotFound => 3,
            Self::InvalidLocale | Self::InvalidArgument | Self::InvalidPayload => 4,
            Self::InvalidSourceState
            | Self::InvalidTargetState
            | Self::TargetDisabled
            | Self::SourceEdited => 5,
            Self::TmsUploadFailed
            | Self::TmsUpdateFailed
            | Self::TmsRequestFailed
            | Self::TmsDownloadFailed
            | Self::TmsCheckFailed
            | Self::PaymentRequired => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether re-issuing the same command can succeed.
    ///
    /// True for every TMS failure (the engine never retries internally;
    /// at-least-once manual retry is always possible) and for validation
    /// errors with corrected input. False for I/O and internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidLocale
                | Self::InvalidArgument
                | Self::InvalidPayload
                | Self::InvalidSourceState
                | Self::InvalidTargetState
                | Self::SourceEdited
                | Self::TmsUploadFailed
                | Self::TmsUpdateFailed
                | Self::TmsRequestFailed
                | Self::TmsDownloadFailed
                | Self::TmsCheckFailed
                | Self::PaymentRequired
                | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in locsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `locsync init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Document not found: {local_ref}")]
    DocumentNotFound { local_ref: String },

    #[error("No target '{locale}' tracked for document {local_ref}")]
    TargetNotFound { local_ref: String, locale: String },

    #[error("Profile not found: {id}")]
    ProfileNotFound { id: String },

    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("Source is {actual}, expected {expected}")]
    InvalidSourceState { expected: String, actual: String },

    #[error("Target '{locale}' is {actual}, expected {expected}")]
    InvalidTargetState {
        locale: String,
        expected: String,
        actual: String,
    },

    #[error("Target language '{locale}' is disabled")]
    TargetDisabled { locale: String },

    #[error("Source content has local edits; update it before requesting translations")]
    SourceEdited,

    /// A TMS port call failed, tagged with the operation that issued it.
    #[error("{op} failed: {source}")]
    Tms {
        /// Operation name ("upload", "update", "request", "download", "check").
        op: &'static str,
        source: TmsError,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::DocumentNotFound { .. } => ErrorCode::DocumentNotFound,
            Self::TargetNotFound { .. } => ErrorCode::TargetNotFound,
            Self::ProfileNotFound { .. } => ErrorCode::ProfileNotFound,
            Self::InvalidLocale(_) => ErrorCode::InvalidLocale,
            Self::InvalidSourceState { .. } => ErrorCode::InvalidSourceState,
            Self::InvalidTargetState { .. } => ErrorCode::InvalidTargetState,
            Self::TargetDisabled { .. } => ErrorCode::TargetDisabled,
            Self::SourceEdited => ErrorCode::SourceEdited,
            Self::Tms { op, source } => match source {
                TmsError::PaymentRequired => ErrorCode::PaymentRequired,
                _ => match *op {
                    "upload" => ErrorCode::TmsUploadFailed,
                    "update" => ErrorCode::TmsUpdateFailed,
                    "request" => ErrorCode::TmsRequestFailed,
                    "download" => ErrorCode::TmsDownloadFailed,
                    _ => ErrorCode::TmsCheckFailed,
                },
            },
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::InvalidPayload(_) => ErrorCode::InvalidPayload,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for humans and scripts.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `locsync init` to set up the project workspace".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Workspace already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::DocumentNotFound { local_ref } => Some(format!(
                "No tracked document for '{local_ref}'. Use `locsync document upload {local_ref}` to start tracking it."
            )),

            Self::TargetNotFound { locale, .. } => Some(format!(
                "Target '{locale}' is not tracked. Check `locsync status` for enabled languages."
            )),

            Self::ProfileNotFound { id } => Some(format!(
                "No profile with ID '{id}'. Use `locsync profile list` to see available profiles."
            )),

            Self::InvalidLocale(_) => {
                Some("Locales look like 'de' or 'pt-BR' (language, optional region)".to_string())
            }

            Self::InvalidSourceState { expected, .. } => Some(format!(
                "The source must be {expected} for this operation. \
                 Check `locsync document show` for the current state."
            )),

            Self::InvalidTargetState { expected, .. } => Some(format!(
                "The target must be {expected} for this operation."
            )),

            Self::TargetDisabled { locale } => Some(format!(
                "'{locale}' is disabled by the document's profile or project settings. \
                 Re-enable it with `locsync profile override` or in config.json."
            )),

            Self::SourceEdited => Some(
                "Run `locsync document update <ref>` to re-send the edited content first"
                    .to_string(),
            ),

            Self::Tms { source, .. } => match source {
                TmsError::PaymentRequired => Some(
                    "The TMS account is out of funds; the source is marked ERROR until resolved"
                        .to_string(),
                ),
                TmsError::DocumentArchived => Some(
                    "The remote document was archived; re-upload with `locsync document upload`"
                        .to_string(),
                ),
                TmsError::DocumentLocked { .. } => Some(
                    "The remote document was re-versioned; retry the same command".to_string(),
                ),
                TmsError::Generic(_) => Some("Retry the same command".to_string()),
            },

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::InvalidPayload(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NotInitialized.exit_code(), 2);
        assert_eq!(
            Error::DocumentNotFound {
                local_ref: "docs/a.md".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(Error::InvalidLocale("x!".into()).exit_code(), 4);
        assert_eq!(Error::SourceEdited.exit_code(), 5);
        assert_eq!(
            Error::Tms {
                op: "upload",
                source: TmsError::Generic("boom".into())
            }
            .exit_code(),
            6
        );
    }

    #[test]
    fn test_tms_failures_are_retryable() {
        let err = Error::Tms {
            op: "download",
            source: TmsError::Generic("socket closed".into()),
        };
        assert!(err.error_code().is_retryable());
        assert_eq!(err.error_code().as_str(), "TMS_DOWNLOAD_FAILED");
    }

    #[test]
    fn test_payment_required_code_wins_over_op() {
        let err = Error::Tms {
            op: "request",
            source: TmsError::PaymentRequired,
        };
        assert_eq!(err.error_code(), ErrorCode::PaymentRequired);
    }

    #[test]
    fn test_structured_json_shape() {
        let err = Error::NotInitialized;
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "NOT_INITIALIZED");
        assert_eq!(json["error"]["exit_code"], 2);
        assert!(json["error"]["hint"].as_str().is_some());
    }
}
