//! Structured per-field validation errors and the custom rules request
//! bodies validate with.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Serialize;
use validator::ValidationError;

use crate::phone::is_valid_international;

/// Field name → messages. Empty means the input is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("validation failed")]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// `Ok(())` when no field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Flattens `validator` output. Rules without a message report their code.
impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = Self::new();
        for (field, failures) in source.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_deref()
                    .map_or_else(|| failure.code.to_string(), str::to_owned);
                errors.add(&field, message);
            }
        }
        errors
    }
}

// ── Custom rules ─────────────────────────────────────────────────────────────

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// `+`, a non-zero leading digit, 8–15 digits in total.
pub fn international_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_international(phone) {
        Ok(())
    } else {
        Err(rule(
            "phone",
            "must be in international format, e.g. +61412345678",
        ))
    }
}

pub fn rfc3339_timestamp(value: &str) -> Result<(), ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| rule("rfc3339", "must be an RFC 3339 timestamp"))
}
