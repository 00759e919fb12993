//! Reusable field validators

use crate::core::error::ApiError;
use std::borrow::Cow;
use uuid::Uuid;
use validator::ValidationError;

/// Validator: string must contain something other than whitespace
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("must not be blank"));
        Err(err)
    } else {
        Ok(())
    }
}

/// Trim a required text field, rejecting it when nothing is left
pub fn require_text(field: &str, value: Option<&str>, message: &str) -> Result<String, ApiError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| ApiError::invalid_field(field, message))
}

/// Parse an identifier taken from a path segment or query parameter
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::invalid_field(field, format!("Invalid {}", field)))
}
