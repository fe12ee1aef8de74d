//! Field-level validation errors.
//!
//! Messages are collected per field name and serialized as
//! `{"field": ["message", ...]}`.

use std::collections::BTreeMap;

use serde::Serialize;

/// Accumulated validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single message on a single field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Merge only the fields that have no messages yet.
    ///
    /// Used when a later validation pass would repeat a field that an
    /// earlier pass already rejected.
    pub fn merge_absent(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_insert(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was collected, otherwise the errors themselves.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Standard messages shared by every input reader.
pub mod messages {
    pub const REQUIRED: &str = "This field is required.";
    pub const BLANK: &str = "This field may not be blank.";
    pub const NULL: &str = "This field may not be null.";

    pub fn max_length(max: usize) -> String {
        format!("Ensure this field has no more than {max} characters.")
    }

    pub fn invalid_choice(value: &str) -> String {
        format!("\"{value}\" is not a valid choice.")
    }

    pub fn missing_object(pk: impl core::fmt::Display) -> String {
        format!("Invalid pk \"{pk}\" - object does not exist.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_multiple_messages_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("phone", messages::BLANK);
        errors.add("phone", messages::max_length(20));
        errors.add("bio", messages::NULL);

        assert_eq!(errors.messages("phone").len(), 2);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["bio", "phone"]);
    }

    #[test]
    fn serializes_as_flat_object() {
        let errors = FieldErrors::single("member_id", messages::REQUIRED);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "member_id": ["This field is required."] }));
    }

    #[test]
    fn merge_absent_keeps_earlier_messages() {
        let mut errors = FieldErrors::single("price", "A valid number is required.");
        let mut later = FieldErrors::single("price", messages::REQUIRED);
        later.add("end_date", messages::REQUIRED);

        errors.merge_absent(later);
        assert_eq!(errors.messages("price"), ["A valid number is required."]);
        assert_eq!(errors.messages("end_date"), [messages::REQUIRED]);
    }

    #[test]
    fn empty_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
