//! Shared rules for applying write payloads to records.

use fitclub_core::FieldErrors;
use fitclub_core::validation::messages;

/// How a write payload is applied to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New record: required fields must be present, optional ones default.
    Create,
    /// Full update: required fields must be present, absent optional fields
    /// keep their current values.
    Replace,
    /// Partial update: every field is optional.
    Patch,
}

impl WriteMode {
    /// Whether fields marked as required must appear in the payload.
    pub fn requires_fields(self) -> bool {
        !matches!(self, WriteMode::Patch)
    }
}

/// Resolve a required field: payload value, else current value (patch only),
/// else a "required" error.
pub(crate) fn required<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<T>,
    current: Option<T>,
    mode: WriteMode,
) -> Option<T> {
    match (value, current) {
        (Some(v), _) => Some(v),
        (None, Some(c)) if !mode.requires_fields() => Some(c),
        (None, _) => {
            errors.add(field, messages::REQUIRED);
            None
        }
    }
}

/// Resolve a relation id that is only mandatory when the record is new.
pub(crate) fn required_on_create<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<T>,
    current: Option<T>,
) -> Option<T> {
    match value.or(current) {
        Some(v) => Some(v),
        None => {
            errors.add(field, messages::REQUIRED);
            None
        }
    }
}

/// Resolve a nullable field: `Some(None)` in the payload clears it, absence
/// keeps the current value (or `None` for new records).
pub(crate) fn nullable<T>(value: Option<Option<T>>, current: Option<Option<T>>) -> Option<T> {
    match value {
        Some(v) => v,
        None => current.flatten(),
    }
}

/// Trim and check a non-blank text field against its maximum length.
pub(crate) fn text(errors: &mut FieldErrors, field: &str, value: String, max: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, messages::BLANK);
        return None;
    }
    if trimmed.chars().count() > max {
        errors.add(field, messages::max_length(max));
        return None;
    }
    Some(trimmed.to_string())
}

/// Trim an optional text field; blank values are stored as empty strings,
/// `max` bounds the length when present.
pub(crate) fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: Option<usize>,
) -> Option<String> {
    let value = value?;
    let trimmed = value.trim().to_string();
    if let Some(max) = max {
        if trimmed.chars().count() > max {
            errors.add(field, messages::max_length(max));
        }
    }
    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_field_missing_on_replace_is_an_error() {
        let mut errors = FieldErrors::new();
        let v: Option<i32> = required(&mut errors, "n", None, Some(1), WriteMode::Replace);
        assert!(v.is_none());
        assert!(errors.contains("n"));
    }

    #[test]
    fn required_field_missing_on_patch_keeps_current() {
        let mut errors = FieldErrors::new();
        let v = required(&mut errors, "n", None, Some(1), WriteMode::Patch);
        assert_eq!(v, Some(1));
        assert!(errors.is_empty());
    }

    #[test]
    fn nullable_distinguishes_absent_from_null() {
        assert_eq!(nullable::<i32>(None, Some(Some(3))), Some(3));
        assert_eq!(nullable::<i32>(Some(None), Some(Some(3))), None);
        assert_eq!(nullable(Some(Some(4)), Some(Some(3))), Some(4));
    }

    #[test]
    fn text_rejects_whitespace_only() {
        let mut errors = FieldErrors::new();
        assert!(text(&mut errors, "phone", "   ".to_string(), 20).is_none());
        assert_eq!(errors.messages("phone"), [messages::BLANK.to_string()]);
    }

    #[test]
    fn text_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        let value = "й".repeat(20);
        assert_eq!(text(&mut errors, "phone", value.clone(), 20), Some(value));
        assert!(errors.is_empty());
    }
}
