//! Validation rules
//!
//! Small field-level checks shared by the passes. Each returns a
//! [`RuleResult`]; the passes decide severity and location.

use hl7_ir::Field;
use regex::Regex;

/// Validation rule result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl RuleResult {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Validate a required field.
///
/// With `presence_only` set, only a literally absent field fails; this is
/// how the header's separator fields are checked.
#[must_use]
pub fn validate_required(field: Option<&Field>, name: &str, presence_only: bool) -> RuleResult {
    match field {
        None if presence_only => RuleResult::invalid(format!("Required field {name} is missing")),
        None => RuleResult::invalid(format!("Required field {name} is missing or empty")),
        Some(field) if !presence_only && field.is_empty() => {
            RuleResult::invalid(format!("Required field {name} is missing or empty"))
        }
        Some(_) => RuleResult::valid(),
    }
}

/// Validate a value's length in characters against optional bounds.
///
/// Empty values are not checked.
#[must_use]
pub fn validate_length(
    value: &str,
    name: &str,
    min_length: Option<usize>,
    max_length: Option<usize>,
) -> RuleResult {
    if value.is_empty() {
        return RuleResult::valid();
    }
    let len = value.chars().count();

    if let Some(max) = max_length {
        if len > max {
            return RuleResult::invalid(format!("Field {name} exceeds maximum length of {max}"));
        }
    }

    if let Some(min) = min_length {
        if len < min {
            return RuleResult::invalid(format!("Field {name} is below minimum length of {min}"));
        }
    }

    RuleResult::valid()
}

/// Validate a non-empty value against a data type pattern
#[must_use]
pub fn validate_pattern(value: &str, name: &str, data_type: &str, pattern: &Regex) -> RuleResult {
    if value.is_empty() || pattern.is_match(value) {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!("Field {name} does not match data type {data_type}"))
    }
}
