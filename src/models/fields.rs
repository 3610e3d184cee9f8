//! Helpers shared by the request types for required/optional field handling.
//!
//! A field counts as supplied when its JSON key is present with a non-null
//! value. Text is trimmed; blank text is treated as not supplied.

use crate::error::{AppError, Result};

/// Record `name` as missing when `value` is `None`, passing the value through.
pub(crate) fn required<T>(
    missing: &mut Vec<&'static str>,
    name: &'static str,
    value: Option<T>,
) -> Option<T> {
    if value.is_none() {
        missing.push(name);
    }
    value
}

/// Trim the value and drop it when blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// For partial updates: a supplied-but-blank value for a NOT NULL text
/// column is rejected instead of being silently ignored.
pub(crate) fn non_blank_update(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Err(AppError::InvalidRequest(format!(
            "El campo '{}' no puede estar vacío",
            name
        ))),
        Some(s) => Ok(Some(s.trim().to_string())),
    }
}

pub(crate) fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!(
            "Email no válido: {}",
            email
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_collects_missing_names() {
        let mut missing = Vec::new();
        let a = required(&mut missing, "a", Some(1));
        let b: Option<i32> = required(&mut missing, "b", None);
        assert_eq!(a, Some(1));
        assert_eq!(b, None);
        assert_eq!(missing, vec!["b"]);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Alhambra ".into())), Some("Alhambra".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_non_blank_update_rejects_empty() {
        assert!(non_blank_update("nombre", Some(" ".into())).is_err());
        assert_eq!(non_blank_update("nombre", None).unwrap(), None);
        assert_eq!(
            non_blank_update("nombre", Some("x ".into())).unwrap(),
            Some("x".into())
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@localhost").is_err());
    }
}
