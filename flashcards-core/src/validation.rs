//! Shared input checks used at service entry.

use crate::messages;
use crate::{CoreError, CoreResult};

/// Blank means empty after trimming whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn require_non_null<T>(value: Option<T>) -> CoreResult<T> {
    value.ok_or_else(|| CoreError::BadRequest(messages::REQUEST_BODY_NULL.to_string()))
}

pub fn require_non_blank(value: &str, field_name: &str) -> CoreResult<()> {
    if is_blank(value) {
        return Err(CoreError::BadRequest(messages::must_not_be_blank(field_name)));
    }
    Ok(())
}

/// Per-field validation of request bodies, reported as a list of messages.
pub trait FieldValidation {
    fn field_errors(&self) -> Vec<&'static str>;

    fn validate_fields(&self) -> CoreResult<()> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::FieldErrors(
                errors.into_iter().map(str::to_string).collect(),
            ))
        }
    }
}
