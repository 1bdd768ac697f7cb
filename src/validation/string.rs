//! String field rules

use crate::condition::Operator;
use crate::field::FieldValueKind;
use crate::validation::shape::{check_shape, unsupported, ValueRule, VALUE_REQUIRED};
use crate::validation::ValidationResult;
use serde_json::Value;
use std::cmp::Ordering;

struct StringRule;

impl ValueRule for StringRule {
    type Item = ();

    fn coerce(&self, value: &Value) -> Result<(), String> {
        if value.is_string() {
            Ok(())
        } else {
            Err("value must be a string".to_string())
        }
    }

    fn compare(&self, _start: &(), _end: &()) -> Result<Ordering, String> {
        Err("strings cannot be used in a range".to_string())
    }
}

/// Validate a constant value for a string field
///
/// Ranges and ordering are rejected as illegal operators, not as bad values.
pub fn validate_string(value: &Value, operator: Operator) -> ValidationResult {
    if !FieldValueKind::String.supports(operator) {
        return unsupported(FieldValueKind::String, operator);
    }

    match operator {
        Operator::MinLength | Operator::MaxLength => validate_length(value, operator),
        _ => check_shape(&StringRule, operator, value),
    }
}

fn validate_length(value: &Value, operator: Operator) -> ValidationResult {
    if value.is_null() {
        return ValidationResult::fail(VALUE_REQUIRED);
    }
    let is_length = match value {
        Value::Number(n) => {
            n.as_u64().is_some() || n.as_f64().map_or(false, |f| f >= 0.0 && f.fract() == 0.0)
        }
        _ => false,
    };
    if is_length {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(format!(
            "operator {} requires a non-negative integer",
            operator
        ))
    }
}
