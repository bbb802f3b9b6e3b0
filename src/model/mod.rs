//! Data models for locsync.
//!
//! This module contains all domain models:
//! - Document (the unit of synchronization)
//! - Target (per-destination-language sub-state)
//! - Profile (automation policy with per-locale overrides)
//! - SourceStatus / TargetStatus (closed lifecycle vocabularies)

pub mod document;
pub mod profile;
pub mod status;

pub use document::{Document, DocumentKind, Target};
pub use profile::{EffectivePolicy, LanguageOverride, Profile};
pub use status::{SourceStatus, TargetStatus};
