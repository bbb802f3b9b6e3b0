//! Input validation for user-supplied identifiers.
//!
//! Locales are normalized to the `xx` / `xx-YY` shape (lower-case
//! language, upper-case region) so the same locale never appears twice
//! under different spellings in the registry.

use crate::error::{Error, Result};

/// Normalize a locale string.
///
/// Accepts `de`, `DE`, `pt-br`, `pt_BR`, etc. and returns the canonical
/// `de` / `pt-BR` form.
///
/// # Errors
///
/// Returns `Error::InvalidLocale` when the input does not look like a
/// language tag.
pub fn normalize_locale(input: &str) -> Result<String> {
    let cleaned = input.trim().replace('_', "-");
    let mut parts = cleaned.split('-');

    let lang = parts.next().unwrap_or_default();
    if !(2..=3).contains(&lang.len()) || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidLocale(input.to_string()));
    }
    let lang = lang.to_ascii_lowercase();

    match parts.next() {
        None => Ok(lang),
        Some(region) => {
            if parts.next().is_some()
                || !(2..=3).contains(&region.len())
                || !region.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(Error::InvalidLocale(input.to_string()));
            }
            Ok(format!("{lang}-{}", region.to_ascii_uppercase()))
        }
    }
}

/// Validate a caller-assigned job id: non-empty, no whitespace.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` for an empty or whitespace-bearing id.
pub fn job_id(input: &str) -> Result<&str> {
    if input.is_empty() || input.chars().any(char::is_whitespace) {
        return Err(Error::InvalidArgument(format!(
            "job id must be non-empty without whitespace, got '{input}'"
        )));
    }
    Ok(input)
}

/// Validate a profile name: non-empty, at most 64 chars.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` for an empty or oversized name.
pub fn profile_name(input: &str) -> Result<&str> {
    if input.trim().is_empty() || input.len() > 64 {
        return Err(Error::InvalidArgument(format!(
            "profile name must be 1-64 characters, got '{input}'"
        )));
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("de").unwrap(), "de");
        assert_eq!(normalize_locale("DE").unwrap(), "de");
        assert_eq!(normalize_locale("pt-br").unwrap(), "pt-BR");
        assert_eq!(normalize_locale("pt_BR").unwrap(), "pt-BR");
        assert_eq!(normalize_locale(" es ").unwrap(), "es");
    }

    #[test]
    fn test_normalize_locale_rejects_garbage() {
        assert!(normalize_locale("").is_err());
        assert!(normalize_locale("x").is_err());
        assert!(normalize_locale("de-DE-bavaria-x").is_err());
        assert!(normalize_locale("d3").is_err());
    }

    #[test]
    fn test_job_id() {
        assert!(job_id("launch-q3").is_ok());
        assert!(job_id("").is_err());
        assert!(job_id("has space").is_err());
    }

    #[test]
    fn test_profile_name() {
        assert!(profile_name("site default").is_ok());
        assert!(profile_name("").is_err());
        assert!(profile_name(&"x".repeat(65)).is_err());
    }
}
