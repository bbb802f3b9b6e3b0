//! TMS client port.
//!
//! Defines the interface the engine uses to talk to the remote
//! Translation Management System. The wire transport behind it is out of
//! scope; implementations receive opaque payload bytes and return typed
//! results. Calls are synchronous and fallible with no engine-level
//! retry: re-issuing the triggering command is always safe.

pub mod mock;
pub mod sandbox;

pub use mock::{MockTmsClient, TmsCall};
pub use sandbox::SandboxTmsClient;

use thiserror::Error;

/// Typed failures from the TMS port.
///
/// `Generic` is the unconfirmable case: the true remote outcome is
/// unknown, so callers must not assert failure they cannot confirm.
/// The other variants are authoritative signals from the TMS.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TmsError {
    /// Unknown failure; the remote state may or may not have changed.
    #[error("TMS error: {0}")]
    Generic(String),

    /// The account cannot pay for the operation. Source-scoped.
    #[error("payment required")]
    PaymentRequired,

    /// The remote document was archived; the cached remote id is invalid.
    #[error("remote document archived")]
    DocumentArchived,

    /// A concurrent edit re-versioned the remote document; the TMS
    /// communicates the replacement id.
    #[error("remote document locked, re-versioned as {new_remote_id}")]
    DocumentLocked { new_remote_id: String },
}

/// Result type for TMS port calls.
pub type TmsResult<T> = std::result::Result<T, TmsError>;

/// Remote progress for a document import or a target translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteProgress {
    /// Whether the remote operation has fully completed.
    pub complete: bool,
    /// Reported completion percentage (0-100).
    pub percentage: u8,
}

impl RemoteProgress {
    /// A finished operation.
    #[must_use]
    pub const fn done() -> Self {
        Self {
            complete: true,
            percentage: 100,
        }
    }

    /// An in-progress operation at the given percentage.
    #[must_use]
    pub const fn at(percentage: u8) -> Self {
        Self {
            complete: false,
            percentage,
        }
    }
}

/// The synchronous TMS client port consumed by the engine.
pub trait TmsClient {
    /// Upload new content; returns the assigned remote document id.
    fn upload(&self, source_locale: &str, content: &[u8]) -> TmsResult<String>;

    /// Re-send content for an existing remote document.
    fn update(&self, remote_id: &str, content: &[u8]) -> TmsResult<()>;

    /// Query import progress for a document.
    fn check_document(&self, remote_id: &str) -> TmsResult<RemoteProgress>;

    /// Request translation into one locale.
    fn add_target(&self, remote_id: &str, locale: &str) -> TmsResult<()>;

    /// Query translation progress for one locale.
    fn check_target(&self, remote_id: &str, locale: &str) -> TmsResult<RemoteProgress>;

    /// Download the translated content for one locale.
    fn download_target(&self, remote_id: &str, locale: &str) -> TmsResult<Vec<u8>>;
}
