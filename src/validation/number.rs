//! Number field rules

use crate::condition::Operator;
use crate::field::FieldValueKind;
use crate::validation::shape::{check_shape, unsupported, ValueRule};
use crate::validation::ValidationResult;
use serde_json::Value;
use std::cmp::Ordering;

struct NumberRule;

impl ValueRule for NumberRule {
    type Item = f64;

    fn coerce(&self, value: &Value) -> Result<f64, String> {
        coerce_number(value).ok_or_else(|| "value must be a finite number".to_string())
    }

    fn compare(&self, start: &f64, end: &f64) -> Result<Ordering, String> {
        start
            .partial_cmp(end)
            .ok_or_else(|| "value must be a finite number".to_string())
    }
}

/// Numeric coercion: JSON numbers and numeric strings, finite only
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Validate a constant value for a number field
pub fn validate_number(value: &Value, operator: Operator) -> ValidationResult {
    if !FieldValueKind::Number.supports(operator) {
        return unsupported(FieldValueKind::Number, operator);
    }
    check_shape(&NumberRule, operator, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(5)), Some(5.0));
        assert_eq!(coerce_number(&json!(2.5)), Some(2.5));
        assert_eq!(coerce_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&Value::Null), None);
    }

    #[test]
    fn test_number_operators() {
        assert!(validate_number(&json!(10), Operator::Gt).valid);
        assert!(validate_number(&json!([1, 2, 3]), Operator::In).valid);
        assert!(validate_number(&json!([25, 50]), Operator::Between).valid);
        assert!(!validate_number(&json!("ten"), Operator::Eq).valid);
    }

    #[test]
    fn test_number_range_ordering() {
        let result = validate_number(&json!([50, 25]), Operator::Between);
        assert!(!result.valid);
        assert!(result.errors[0].contains("ordering"));

        assert!(!validate_number(&json!([5, 5]), Operator::NotBetween).valid);
    }

    #[test]
    fn test_number_rejects_string_operators() {
        let result = validate_number(&json!(3), Operator::Contains);
        assert!(result.errors[0].contains("not supported for number fields"));
    }
}
