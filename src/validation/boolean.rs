//! Boolean field rules

use crate::condition::Operator;
use crate::field::FieldValueKind;
use crate::validation::shape::{check_shape, unsupported, ValueRule};
use crate::validation::ValidationResult;
use serde_json::Value;
use std::cmp::Ordering;

struct BooleanRule;

impl ValueRule for BooleanRule {
    type Item = bool;

    fn coerce(&self, value: &Value) -> Result<bool, String> {
        coerce_bool(value).ok_or_else(|| "value must be true or false".to_string())
    }

    fn compare(&self, start: &bool, end: &bool) -> Result<Ordering, String> {
        Ok(start.cmp(end))
    }
}

/// JSON booleans, or the strings "true"/"false" in any case
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Validate a constant value for a boolean field
pub fn validate_boolean(value: &Value, operator: Operator) -> ValidationResult {
    if !FieldValueKind::Boolean.supports(operator) {
        return unsupported(FieldValueKind::Boolean, operator);
    }
    check_shape(&BooleanRule, operator, value)
}
