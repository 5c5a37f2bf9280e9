use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Validation messages keyed by field name, in the order they were added.
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Check the `required` and `max:<n>` rules on a text field. Returns the
/// value when it passed both.
pub fn required_text<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    value: &'a str,
    max: usize,
    required_message: &str,
) -> Option<&'a str> {
    if value.is_empty() {
        errors.add(field, required_message);
        return None;
    }
    if value.chars().count() > max {
        errors.add(field, format!("The {field} may not be greater than {max} characters."));
        return None;
    }
    Some(value)
}

/// Check the `max:<n>` rule on an optional text field.
pub fn optional_text(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        if value.chars().count() > max {
            errors.add(field, format!("The {field} may not be greater than {max} characters."));
        }
    }
}

/// Trimmed value, with blank input treated as absent.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parse a boolean form field. Absent values fall back to `default`.
pub fn boolean(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    default: bool,
) -> bool {
    match value {
        None => default,
        Some("1" | "true" | "on" | "yes") => true,
        Some("0" | "false" | "off" | "no") => false,
        Some(_) => {
            errors.add(field, format!("The {field} field must be true or false."));
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_multiple_messages_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("slug", "first");
        errors.add("slug", "second");
        assert_eq!(errors.messages("slug"), ["first", "second"]);
        assert!(errors.messages("name").is_empty());
    }

    #[test]
    fn empty_errors_pass() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn required_text_enforces_length() {
        let mut errors = ValidationErrors::new();
        let long = "x".repeat(256);
        assert_eq!(required_text(&mut errors, "name", &long, 255, "required"), None);
        assert_eq!(
            errors.messages("name"),
            ["The name may not be greater than 255 characters."]
        );
        assert_eq!(required_text(&mut errors, "title", "", 255, "required"), None);
        assert_eq!(errors.messages("title"), ["required"]);
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  a b ")).as_deref(), Some("a b"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn boolean_accepts_form_spellings() {
        let mut errors = ValidationErrors::new();
        assert!(boolean(&mut errors, "is_active", Some("on"), false));
        assert!(!boolean(&mut errors, "is_active", Some("0"), true));
        assert!(boolean(&mut errors, "is_active", None, true));
        assert!(errors.is_empty());
        boolean(&mut errors, "is_featured", Some("maybe"), false);
        assert!(errors.has("is_featured"));
    }
}
