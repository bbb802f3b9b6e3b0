//! locsync - Translation lifecycle synchronization for local content
//!
//! This crate provides the core functionality for the `locsync` CLI tool:
//! keeping local translatable content consistent with a remote
//! Translation Management System across user commands, batch operations,
//! and inbound webhook notifications.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Document, Target, Profile, statuses)
//! - [`storage`] - SQLite registry (documents, targets, profiles, audit)
//! - [`engine`] - The synchronization state machine
//! - [`notify`] - Webhook payload parsing and dispatch
//! - [`jobs`] - Derived job grouping index
//! - [`tms`] - TMS client port (trait + test double)
//! - [`content`] - Content provider capability (file-based impl)
//! - [`config`] - Workspace discovery and project settings
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod model;
pub mod notify;
pub mod storage;
pub mod tms;
pub mod validate;

pub use error::{Error, Result};

/// Global silent mode flag for `--silent` output.
///
/// When set, mutate commands print only the essential identifier
/// instead of full output. Avoids threading a `silent` bool through
/// every handler signature.
pub static SILENT: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if silent mode is active.
#[inline]
pub fn is_silent() -> bool {
    SILENT.load(std::sync::atomic::Ordering::Relaxed)
}
